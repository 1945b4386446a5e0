//! Passcode verification against existence and expiry.
//!
//! Verification is read-only: a record verifies as many times as it is
//! presented until it expires.

mod config;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::VerificationServiceConfig;
pub use service::VerificationService;
pub use types::VerificationOutcome;
