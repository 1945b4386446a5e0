//! Environment configuration module

use serde::{Deserialize, Serialize};

use super::{parsed_or, ConfigError};

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging/test environment
    Staging,
    /// Production environment
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Read ENVIRONMENT, then ENV, then RUST_ENV; unknown values mean development
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        ["ENVIRONMENT", "ENV", "RUST_ENV"]
            .iter()
            .find_map(|var| lookup(var))
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" | "test" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Subscriber settings for the API binary
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset (LOG_LEVEL)
    pub level: String,

    /// Output format (LOG_FORMAT)
    pub format: LogFormat,

    /// Emit file and line of each event
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    /// Human-readable and verbose in development, JSON at info elsewhere
    pub fn for_environment(env: Environment) -> Self {
        let development = env == Environment::Development;
        Self {
            level: String::from(if development { "debug" } else { "info" }),
            format: if development { LogFormat::Pretty } else { LogFormat::Json },
            source_location: development,
        }
    }

    /// Apply LOG_LEVEL and LOG_FORMAT on top of the environment defaults
    pub fn from_lookup<F>(lookup: &F, env: Environment) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::for_environment(env);
        Ok(Self {
            level: lookup("LOG_LEVEL")
                .filter(|level| !level.trim().is_empty())
                .unwrap_or_else(|| defaults.level.clone()),
            format: parsed_or(lookup, "LOG_FORMAT", defaults.format)?,
            ..defaults
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" | "text" => Ok(LogFormat::Compact),
            _ => Err(format!("unknown log format '{}'", s)),
        }
    }
}
