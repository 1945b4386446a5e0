//! Change events emitted by the record store.
//!
//! Payloads arrive over an at-least-once feed, possibly out of order and
//! possibly more than once. Record attributes are optional because a feed
//! payload is not trusted to be complete.

use serde::{Deserialize, Serialize};

use crate::domain::entities::OtpRecord;

/// Kind of mutation a change event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Modify,
    Remove,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Insert => write!(f, "INSERT"),
            ChangeKind::Modify => write!(f, "MODIFY"),
            ChangeKind::Remove => write!(f, "REMOVE"),
        }
    }
}

impl std::str::FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INSERT" => Ok(ChangeKind::Insert),
            "MODIFY" => Ok(ChangeKind::Modify),
            "REMOVE" => Ok(ChangeKind::Remove),
            _ => Err(format!("unknown change kind '{}'", s)),
        }
    }
}

/// Attributes of a record as carried in a change event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordImage {
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl From<&OtpRecord> for RecordImage {
    fn from(record: &OtpRecord) -> Self {
        Self {
            session_token: Some(record.session_token.clone()),
            otp: Some(record.otp.clone()),
            email: Some(record.email.clone()),
            expires_at: Some(record.expires_at),
        }
    }
}

/// A single store mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    #[serde(rename = "eventName")]
    pub kind: ChangeKind,
    #[serde(default)]
    pub new_image: Option<RecordImage>,
}

impl ChangeEvent {
    /// Creation event carrying the full new record
    pub fn created(record: &OtpRecord) -> Self {
        Self {
            kind: ChangeKind::Insert,
            new_image: Some(RecordImage::from(record)),
        }
    }

    pub fn is_creation(&self) -> bool {
        self.kind == ChangeKind::Insert
    }
}

/// One hand-off of an event by the feed. `delivery_id` is what gets acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDelivery {
    pub delivery_id: String,
    pub event: ChangeEvent,
}

impl ChangeDelivery {
    pub fn new(delivery_id: impl Into<String>, event: ChangeEvent) -> Self {
        Self {
            delivery_id: delivery_id.into(),
            event,
        }
    }
}
