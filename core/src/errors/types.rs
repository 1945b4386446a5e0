//! Error types for the record store and the email channel
//!
//! These errors are produced by collaborator implementations and carried
//! through `DomainError` so callers can tell a failed check apart from a
//! negative result.

use thiserror::Error;

/// Record store failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Record store {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Record already exists for session {}", session_part(.key))]
    Conflict { key: String },

    #[error("Malformed record key for session {}", session_part(.key))]
    MalformedKey { key: String },

    #[error("Record serialization failed: {message}")]
    Serialization { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }

    /// Transient failures worth retrying at the caller or infrastructure level
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. } | StoreError::Timeout { .. })
    }
}

/// Session token half of an identity key; the passcode half never reaches logs
fn session_part(key: &str) -> &str {
    key.split('_').next().unwrap_or(key)
}

/// Email channel failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Email provider {provider} failed: {message}")]
    Channel { provider: String, message: String },

    /// The provider refused the message outright (an SMTP 5xx reply)
    #[error("Email provider {provider} rejected the message: {message}")]
    Rejected { provider: String, message: String },

    #[error("Invalid recipient address: {address}")]
    InvalidRecipient { address: String },

    #[error("Failed to build email message: {message}")]
    Build { message: String },
}

impl NotificationError {
    pub fn channel(provider: impl Into<String>, message: impl Into<String>) -> Self {
        NotificationError::Channel {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Failures that sending the same message again cannot fix
    pub fn is_permanent(&self) -> bool {
        !matches!(self, NotificationError::Channel { .. })
    }
}
