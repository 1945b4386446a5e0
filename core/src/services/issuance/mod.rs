//! Passcode issuance: generate a credential pair, persist it with an expiry,
//! and hand the session token back to the caller.
//!
//! The passcode itself only leaves the system through the notification
//! dispatcher, which reacts to the store's creation event.

mod config;
mod service;
mod types;


pub use config::IssuanceServiceConfig;
pub use service::IssuanceService;
pub use types::IssuedOtp;
