//! Configuration for the issuance service

use std::time::Duration;

use otp_shared::config::{OtpConfig, StoreConfig};

/// Configuration for the issuance service
#[derive(Debug, Clone)]
pub struct IssuanceServiceConfig {
    /// Minutes before an issued passcode expires
    pub ttl_minutes: u32,
    /// Number of digits in a passcode
    pub otp_length: usize,
    /// Deadline for the store write
    pub store_timeout: Duration,
}

impl IssuanceServiceConfig {
    pub fn from_settings(otp: &OtpConfig, store: &StoreConfig) -> Self {
        Self {
            ttl_minutes: otp.ttl_minutes,
            otp_length: otp.otp_length as usize,
            store_timeout: Duration::from_millis(store.timeout_ms),
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        i64::from(self.ttl_minutes) * 60
    }
}

impl Default for IssuanceServiceConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 5,
            otp_length: 6,
            store_timeout: Duration::from_secs(3),
        }
    }
}
