use serde::{Deserialize, Serialize};

/// Result of a successful issuance. The passcode is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedOtp {
    pub session_token: String,
    /// Unix timestamp (seconds) at which the passcode stops verifying
    pub expires_at: i64,
}
