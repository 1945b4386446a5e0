//! SMTP email channel on lettre's async transport

use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::info;
use uuid::Uuid;

use otp_core::errors::NotificationError;
use otp_core::services::EmailChannel;
use otp_shared::config::EmailConfig;
use otp_shared::utils::mask_email;

use crate::InfrastructureError;

const PROVIDER: &str = "SMTP";

/// Sends mail through an SMTP relay
pub struct SmtpEmailChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    /// Domain used in generated Message-ID headers
    message_id_domain: String,
}

impl SmtpEmailChannel {
    pub fn new(config: &EmailConfig) -> Result<Self, InfrastructureError> {
        let from = config.sender_mailbox().parse::<Mailbox>().map_err(|e| {
            InfrastructureError::Config(format!("Invalid FROM_ADDRESS: {}", e))
        })?;

        let smtp = &config.smtp;
        let builder = if smtp.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
        }
        .map_err(|e| InfrastructureError::Config(format!("Failed to configure SMTP transport: {}", e)))?
        .port(smtp.port);

        let builder = if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
            builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            builder
        };

        let message_id_domain = from.email.domain().to_string();

        info!(host = %smtp.host, port = smtp.port, starttls = smtp.starttls, "SMTP transport configured");

        Ok(Self {
            transport: builder.build(),
            from,
            message_id_domain,
        })
    }

    fn build_message(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        message_id: &str,
    ) -> Result<Message, NotificationError> {
        let recipient = to.parse::<Mailbox>().map_err(|_| NotificationError::InvalidRecipient {
            address: mask_email(to),
        })?;

        Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .message_id(Some(message_id.to_string()))
            .header(header::ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| NotificationError::Build {
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl EmailChannel for SmtpEmailChannel {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<String, NotificationError> {
        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.message_id_domain);
        let message = self.build_message(to, subject, html_body, &message_id)?;

        self.transport.send(message).await.map_err(|e| {
            if e.is_permanent() {
                NotificationError::Rejected {
                    provider: PROVIDER.to_string(),
                    message: e.to_string(),
                }
            } else {
                InfrastructureError::Email(e.to_string()).into_notification_error(PROVIDER)
            }
        })?;

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
