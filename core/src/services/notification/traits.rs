//! Trait definitions for outbound email

use async_trait::async_trait;

use crate::errors::NotificationError;

/// Outbound email transport
///
/// Implementations send one message per call and do not retry.
#[async_trait]
pub trait EmailChannel: Send + Sync {
    /// Send an HTML message
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Provider message id
    /// * `Err(NotificationError)` - The provider rejected or failed the send
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<String, NotificationError>;

    /// Provider name used in logs
    fn provider_name(&self) -> &str;
}
