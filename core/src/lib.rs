//! # OTP Relay Core
//!
//! Core business logic and domain layer for the OTP relay backend.
//! This crate contains the passcode record entity, the credential generator,
//! the record store and change feed interfaces, the issuance, verification
//! and notification services, and the error types they share.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
