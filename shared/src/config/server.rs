//! Server configuration module

use serde::{Deserialize, Serialize};

use super::{parsed_or, ConfigError};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    pub workers: usize,

    /// Maximum JSON payload size in bytes
    pub max_payload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 8080,
            workers: 0,
            max_payload_size: 16 * 1024,
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Read SERVER_HOST / SERVER_PORT / SERVER_WORKERS
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("SERVER_HOST").unwrap_or(defaults.host),
            port: parsed_or(lookup, "SERVER_PORT", defaults.port)?,
            workers: parsed_or(lookup, "SERVER_WORKERS", defaults.workers)?,
            max_payload_size: parsed_or(lookup, "SERVER_MAX_PAYLOAD", defaults.max_payload_size)?,
        })
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::lookup_from;

    #[test]
    fn test_server_overrides() {
        let lookup = lookup_from(&[("SERVER_HOST", "0.0.0.0"), ("SERVER_PORT", "9000")]);
        let config = ServerConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
    }

    #[test]
    fn test_invalid_port() {
        let lookup = lookup_from(&[("SERVER_PORT", "http")]);
        assert!(ServerConfig::from_lookup(&lookup).is_err());
    }
}
