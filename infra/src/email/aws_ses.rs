//! AWS SES v2 email channel
//!
//! Credentials come from the default AWS provider chain (environment,
//! profile, instance role).

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sesv2::config::Region;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;
use tracing::info;

use otp_core::errors::NotificationError;
use otp_core::services::EmailChannel;
use otp_shared::config::EmailConfig;

use crate::InfrastructureError;

const PROVIDER: &str = "AWS SES";
const CHARSET: &str = "UTF-8";

/// Sends mail through the SES v2 `SendEmail` API
pub struct SesEmailChannel {
    client: SesClient,
    source: String,
}

impl SesEmailChannel {
    pub async fn new(config: &EmailConfig) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .load()
            .await;

        info!(region = %config.aws_region, "AWS SES email channel initialized");

        Self {
            client: SesClient::new(&aws_config),
            source: config.sender_mailbox(),
        }
    }

    fn content(data: &str) -> Result<Content, NotificationError> {
        Content::builder()
            .data(data)
            .charset(CHARSET)
            .build()
            .map_err(|e| NotificationError::Build {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl EmailChannel for SesEmailChannel {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<String, NotificationError> {
        let message = Message::builder()
            .subject(Self::content(subject)?)
            .body(Body::builder().html(Self::content(html_body)?).build())
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(&self.source)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| {
                let rejected = e
                    .as_service_error()
                    .map(|se| se.is_message_rejected())
                    .unwrap_or(false);
                if rejected {
                    NotificationError::Rejected {
                        provider: PROVIDER.to_string(),
                        message: e.to_string(),
                    }
                } else {
                    InfrastructureError::Email(e.to_string()).into_notification_error(PROVIDER)
                }
            })?;

        Ok(output.message_id().unwrap_or_default().to_string())
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
