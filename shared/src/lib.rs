//! Shared utilities and common types for the OTP relay server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the process environment
//! - Error response structures
//! - Utility functions (email validation, log masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, DispatcherConfig, EmailConfig, EmailProvider, Environment,
    LoggingConfig, OtpConfig, ServerConfig, SmtpConfig, StoreBackend, StoreConfig,
};
pub use errors::{error_codes, ErrorResponse, MessageResponse};
pub use utils::validation;
