//! Record store configuration module

use serde::{Deserialize, Serialize};

use super::{parsed_or, required, ConfigError};

/// Which record store implementation to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Redis keys with expiry plus a Redis stream change feed
    #[default]
    Redis,
    /// Process-local map, for development and tests
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("unknown store backend '{}'", s)),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Namespace for record keys and the change stream (DB_TABLE)
    pub store_ref: String,

    /// Backend selection (STORE_BACKEND)
    pub backend: StoreBackend,

    /// Redis connection URL (REDIS_URL)
    pub url: String,

    /// Deadline for a single store call in milliseconds (STORE_TIMEOUT_MS)
    pub timeout_ms: u64,

    /// Attempts when establishing the initial connection
    pub connect_retries: u32,
}

impl StoreConfig {
    /// Create a new store configuration for a namespace
    pub fn new(store_ref: impl Into<String>) -> Self {
        Self {
            store_ref: store_ref.into(),
            backend: StoreBackend::default(),
            url: String::from("redis://localhost:6379"),
            timeout_ms: 3000,
            connect_retries: 3,
        }
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::new(required(lookup, "DB_TABLE")?);
        Ok(Self {
            backend: parsed_or(lookup, "STORE_BACKEND", defaults.backend)?,
            url: lookup("REDIS_URL").unwrap_or_else(|| defaults.url.clone()),
            timeout_ms: parsed_or(lookup, "STORE_TIMEOUT_MS", defaults.timeout_ms)?,
            connect_retries: parsed_or(lookup, "STORE_CONNECT_RETRIES", defaults.connect_retries)?,
            ..defaults
        })
    }

    /// Redis key under which a record is stored
    pub fn record_key(&self, identity_key: &str) -> String {
        format!("{}:otp:{}", self.store_ref, identity_key)
    }

    /// Redis stream carrying creation events
    pub fn change_stream_key(&self) -> String {
        format!("{}:changes", self.store_ref)
    }
}
