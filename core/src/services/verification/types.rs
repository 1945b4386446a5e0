//! Result types for the verification service

use serde::{Deserialize, Serialize};

/// Result of checking a session token and passcode pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// A matching record exists and has not expired
    Verified,
    /// A matching record exists but its expiry has passed
    Expired,
    /// No record matches the pair
    NotFound,
}

