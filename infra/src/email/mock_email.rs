//! Mock Email Channel Implementation
//!
//! Logs messages instead of sending them. Used for development
//! (`EMAIL_PROVIDER=mock`) and in tests, where sent messages can be inspected.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use otp_core::errors::NotificationError;
use otp_core::services::EmailChannel;
use otp_shared::utils::{is_valid_email, mask_email};

/// A message accepted by [`MockEmailChannel`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Mock email channel for development and testing
#[derive(Clone, Default)]
pub struct MockEmailChannel {
    message_count: Arc<AtomicU64>,
    simulate_failure: Arc<AtomicBool>,
    failing_recipients: Arc<Mutex<HashSet<String>>>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl MockEmailChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages accepted
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    /// Simulate a failure for every send to `address`
    pub fn fail_for(&self, address: impl Into<String>) {
        if let Ok(mut failing) = self.failing_recipients.lock() {
            failing.insert(address.into());
        }
    }

    fn is_failing(&self, to: &str) -> bool {
        self.simulate_failure.load(Ordering::SeqCst)
            || self
                .failing_recipients
                .lock()
                .map(|failing| failing.contains(to))
                .unwrap_or(false)
    }

    /// Messages accepted so far, oldest first
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmailChannel for MockEmailChannel {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<String, NotificationError> {
        if !is_valid_email(to) {
            return Err(NotificationError::InvalidRecipient {
                address: mask_email(to),
            });
        }

        if self.is_failing(to) {
            warn!(email = %mask_email(to), "Mock email channel simulating failure");
            return Err(NotificationError::channel(
                self.provider_name(),
                "Simulated email sending failure",
            ));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentMessage {
                message_id: message_id.clone(),
                to: to.to_string(),
                subject: subject.to_string(),
                html_body: html_body.to_string(),
            });
        }

        info!(
            target: "email_channel",
            provider = "mock",
            email = %mask_email(to),
            message_id = %message_id,
            count,
            body_length = html_body.len(),
            "Email accepted (mock)"
        );

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}
