//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `dispatcher` - Change feed consumer tuning
//! - `email` - Outbound email channel and sender identity
//! - `environment` - Environment detection and logging configuration
//! - `otp` - Passcode length and lifetime
//! - `server` - HTTP server bind address
//! - `store` - Record store backend and namespace
//!
//! Every section is read from environment variables. Loaders take a lookup
//! function so the same code path serves both `std::env` and tests.

pub mod dispatcher;
pub mod email;
pub mod environment;
pub mod otp;
pub mod server;
pub mod store;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

// Re-export commonly used types
pub use dispatcher::DispatcherConfig;
pub use email::{EmailConfig, EmailProvider, SmtpConfig};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpConfig;
pub use server::ServerConfig;
pub use store::{StoreBackend, StoreConfig};

/// Errors raised while loading configuration.
///
/// These are startup-time failures; the binary refuses to start on any of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {var}")]
    Missing { var: String },

    #[error("Invalid value for {var}: {message}")]
    Invalid { var: String, message: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Passcode generation and lifetime
    pub otp: OtpConfig,

    /// Record store configuration
    pub store: StoreConfig,

    /// Email channel configuration
    pub email: EmailConfig,

    /// Change feed consumer configuration
    pub dispatcher: DispatcherConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is honoured if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_lookup(&lookup);

        Ok(Self {
            environment,
            server: ServerConfig::from_lookup(&lookup)?,
            otp: OtpConfig::from_lookup(&lookup)?,
            store: StoreConfig::from_lookup(&lookup)?,
            email: EmailConfig::from_lookup(&lookup)?,
            dispatcher: DispatcherConfig::from_lookup(&lookup)?,
            logging: LoggingConfig::from_lookup(&lookup, environment)?,
        })
    }
}

/// Read a variable that must be present and non-blank.
pub(crate) fn required<F>(lookup: &F, var: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Missing {
            var: var.to_string(),
        }),
    }
}

/// Parse a variable, falling back to `default` when it is absent.
pub(crate) fn parsed_or<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var: var.to_string(),
                message: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

/// Parse a required integer that must be strictly positive.
pub(crate) fn positive<F>(lookup: &F, var: &str) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = required(lookup, var)?;
    match raw.parse::<u32>() {
        Ok(0) => Err(ConfigError::Invalid {
            var: var.to_string(),
            message: "must be greater than zero".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::Invalid {
            var: var.to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    /// Build a lookup function over a fixed set of variables.
    pub fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    /// The minimal set of variables for a valid configuration.
    pub const REQUIRED: &[(&str, &str)] = &[
        ("OTP_EXPIRY_MINUTES", "5"),
        ("TOKEN_LENGTH", "6"),
        ("DB_TABLE", "otp-records"),
        ("FROM_ADDRESS", "no-reply@example.com"),
    ];

    /// Required variables plus a transport that needs no further settings.
    pub fn minimal() -> Vec<(&'static str, &'static str)> {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("EMAIL_PROVIDER", "mock"));
        pairs
    }
}
