//! Email channel implementations
//!
//! - **SMTP**: lettre async transport (feature `smtp`)
//! - **AWS SES**: SES v2 `SendEmail` (feature `aws-ses`)
//! - **Mock**: logs and records messages for development and tests

use std::sync::Arc;

use otp_core::services::EmailChannel;
use otp_shared::config::{EmailConfig, EmailProvider};

use crate::InfrastructureError;

pub mod mock_email;

#[cfg(feature = "smtp")]
pub mod smtp;

#[cfg(feature = "aws-ses")]
pub mod aws_ses;

pub use mock_email::{MockEmailChannel, SentMessage};

#[cfg(feature = "smtp")]
pub use smtp::SmtpEmailChannel;

#[cfg(feature = "aws-ses")]
pub use aws_ses::SesEmailChannel;

/// Create the email channel selected by `config.provider`
///
/// A provider whose cargo feature is not compiled in is a configuration error.
pub async fn create_email_channel(
    config: &EmailConfig,
) -> Result<Arc<dyn EmailChannel>, InfrastructureError> {
    let channel: Arc<dyn EmailChannel> = match config.provider {
        EmailProvider::Mock => Arc::new(MockEmailChannel::new()),
        #[cfg(feature = "smtp")]
        EmailProvider::Smtp => Arc::new(SmtpEmailChannel::new(config)?),
        #[cfg(feature = "aws-ses")]
        EmailProvider::AwsSes => Arc::new(SesEmailChannel::new(config).await),
        #[allow(unreachable_patterns)]
        other => {
            return Err(InfrastructureError::Config(format!(
                "email provider '{}' is not compiled into this build",
                other
            )))
        }
    };

    tracing::info!(provider = channel.provider_name(), "Email channel initialized");
    Ok(channel)
}
