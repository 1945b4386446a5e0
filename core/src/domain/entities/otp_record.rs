//! Passcode record entity persisted by the record store.

use serde::{Deserialize, Serialize};

/// Length of a session token
pub const SESSION_TOKEN_LENGTH: usize = 32;

/// Separator between session token and passcode in the identity key
pub const IDENTITY_KEY_SEPARATOR: char = '_';

/// Build the composite lookup key for a session token and passcode.
///
/// Session tokens and passcodes never contain the separator, so the key
/// splits back into exactly one pair.
pub fn identity_key(session_token: &str, otp: &str) -> String {
    format!("{}{}{}", session_token, IDENTITY_KEY_SEPARATOR, otp)
}

/// Whether a pair uses only the characters issuance produces
///
/// Session tokens are ASCII alphanumeric and passcodes are ASCII digits, so
/// anything else (the separator, store-reserved characters) names no record.
pub fn is_well_formed_pair(session_token: &str, otp: &str) -> bool {
    !session_token.is_empty()
        && !otp.is_empty()
        && session_token.chars().all(|c| c.is_ascii_alphanumeric())
        && otp.chars().all(|c| c.is_ascii_digit())
}

/// One issued passcode, addressed by its session token and the passcode itself.
///
/// Records are written once and never updated. Serialized field names match
/// the wire format of change feed payloads (`sessionToken`, `expiresAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRecord {
    /// Public half of the credential pair, returned to the caller
    pub session_token: String,

    /// Secret half, delivered only by email
    pub otp: String,

    /// Destination address for the notification
    pub email: String,

    /// Unix timestamp (seconds) after which the record is no longer valid
    pub expires_at: i64,
}

impl OtpRecord {
    pub fn new(
        session_token: impl Into<String>,
        otp: impl Into<String>,
        email: impl Into<String>,
        expires_at: i64,
    ) -> Self {
        Self {
            session_token: session_token.into(),
            otp: otp.into(),
            email: email.into(),
            expires_at,
        }
    }

    /// Create a record issued at `issued_at` that lives for `ttl_seconds`.
    pub fn issue(
        session_token: impl Into<String>,
        otp: impl Into<String>,
        email: impl Into<String>,
        issued_at: i64,
        ttl_seconds: i64,
    ) -> Self {
        Self::new(session_token, otp, email, issued_at + ttl_seconds)
    }

    /// The composite key this record is stored under
    pub fn identity_key(&self) -> String {
        identity_key(&self.session_token, &self.otp)
    }

    /// Whether the record still verifies at `now` (inclusive of the expiry second)
    pub fn is_valid_at(&self, now: i64) -> bool {
        now <= self.expires_at
    }

    /// Seconds of validity left at `now`, zero once expired
    pub fn remaining_seconds(&self, now: i64) -> i64 {
        (self.expires_at - now).max(0)
    }
}
