//! Change feed consumer configuration

use serde::{Deserialize, Serialize};

use super::{parsed_or, ConfigError};

/// Tuning for the notification dispatcher's feed consumer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatcherConfig {
    /// Sleep between polls when the feed is empty or failing, in milliseconds
    pub poll_interval_ms: u64,

    /// Maximum deliveries fetched per poll
    pub batch_size: usize,

    /// Idle time after which an unacknowledged delivery is handed out again, in milliseconds
    pub claim_idle_ms: u64,

    /// Consumer group name on the change stream
    pub group: String,

    /// Consumer name within the group, unique per process
    pub consumer: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            batch_size: 25,
            claim_idle_ms: 60_000,
            group: String::from("otp-notifier"),
            consumer: format!("notifier-{}", std::process::id()),
        }
    }
}

impl DispatcherConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            poll_interval_ms: parsed_or(lookup, "DISPATCHER_POLL_INTERVAL_MS", defaults.poll_interval_ms)?,
            batch_size: parsed_or(lookup, "DISPATCHER_BATCH_SIZE", defaults.batch_size)?,
            claim_idle_ms: parsed_or(lookup, "DISPATCHER_CLAIM_IDLE_MS", defaults.claim_idle_ms)?,
            group: lookup("DISPATCHER_GROUP").unwrap_or_else(|| defaults.group.clone()),
            consumer: lookup("DISPATCHER_CONSUMER").unwrap_or_else(|| defaults.consumer.clone()),
        })
    }
}
