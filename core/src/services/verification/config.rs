//! Configuration for the verification service

use std::time::Duration;

use otp_shared::config::StoreConfig;

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Deadline for the store lookup
    pub store_timeout: Duration,
}

impl VerificationServiceConfig {
    pub fn from_settings(store: &StoreConfig) -> Self {
        Self {
            store_timeout: Duration::from_millis(store.timeout_ms),
        }
    }
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(3),
        }
    }
}
