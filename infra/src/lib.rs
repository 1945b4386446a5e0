//! # Infrastructure Layer
//!
//! Concrete implementations of the collaborators the core services depend on:
//!
//! - **Store**: Redis record store with an atomic change stream, plus an
//!   in-process store for development and tests
//! - **Email**: SMTP (lettre), AWS SES and mock email channels
//!
//! ## Features
//!
//! - `redis-store`: Redis record store and change feed (default)
//! - `smtp`: SMTP email channel (default)
//! - `aws-ses`: AWS SES v2 email channel

use otp_core::errors::{NotificationError, StoreError};

/// Redis connection handling
#[cfg(feature = "redis-store")]
pub mod cache;

/// Email channel implementations
pub mod email;

/// Record store and change feed implementations
pub mod store;

pub use email::{create_email_channel, MockEmailChannel};
pub use store::{InMemoryChangeFeed, InMemoryOtpStore};

#[cfg(feature = "redis-store")]
pub use cache::RedisClient;
#[cfg(feature = "redis-store")]
pub use store::{RedisChangeFeed, RedisOtpStore};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis error
    #[cfg(feature = "redis-store")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Record (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Email channel error
    #[error("Email service error: {0}")]
    Email(String),
}

impl From<InfrastructureError> for StoreError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            #[cfg(feature = "redis-store")]
            InfrastructureError::Cache(e) if e.kind() == redis::ErrorKind::TypeError => {
                StoreError::Serialization {
                    message: e.to_string(),
                }
            }
            InfrastructureError::Serialization(e) => StoreError::Serialization {
                message: e.to_string(),
            },
            other => StoreError::unavailable(other.to_string()),
        }
    }
}

impl InfrastructureError {
    /// Convert an email failure for `provider` into the core error type
    pub fn into_notification_error(self, provider: &str) -> NotificationError {
        NotificationError::channel(provider, self.to_string())
    }
}
