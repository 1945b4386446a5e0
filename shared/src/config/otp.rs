//! Passcode configuration

use serde::{Deserialize, Serialize};

use super::{positive, ConfigError};

/// Lifetime and shape of issued passcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Minutes before an issued passcode expires (OTP_EXPIRY_MINUTES)
    pub ttl_minutes: u32,

    /// Number of digits in a passcode (TOKEN_LENGTH)
    pub otp_length: u32,
}

impl OtpConfig {
    pub fn new(ttl_minutes: u32, otp_length: u32) -> Self {
        Self {
            ttl_minutes,
            otp_length,
        }
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            ttl_minutes: positive(lookup, "OTP_EXPIRY_MINUTES")?,
            otp_length: positive(lookup, "TOKEN_LENGTH")?,
        })
    }

    /// Lifetime in seconds
    pub fn ttl_seconds(&self) -> i64 {
        i64::from(self.ttl_minutes) * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_seconds() {
        assert_eq!(OtpConfig::new(5, 6).ttl_seconds(), 300);
        assert_eq!(OtpConfig::new(1, 4).ttl_seconds(), 60);
    }
}
