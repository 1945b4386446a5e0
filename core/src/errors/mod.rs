//! Domain-specific error types and error handling.

mod types;


// Re-export all error types
pub use types::{NotificationError, StoreError};

use thiserror::Error;

/// Core domain errors returned by the services
///
/// Missing and expired passcodes are not errors; they are values of
/// `VerificationOutcome`. Email failures stay inside the dispatcher as
/// `NotificationError` and never reach a request handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing request field, including invalid email syntax
    #[error("Invalid input for {field}: {message}")]
    InvalidInput { field: String, message: String },

    /// The record store could not complete an operation
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl DomainError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the caller (or its infrastructure) may retry the operation
    pub fn is_retryable(&self) -> bool {
        match self {
            DomainError::Storage(e) => e.is_retryable(),
            DomainError::InvalidInput { .. } => false,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
