//! Email channel configuration module

use serde::{Deserialize, Serialize};

use super::{parsed_or, required, ConfigError};

/// Email provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmailProvider {
    /// SMTP relay
    #[default]
    Smtp,
    /// AWS Simple Email Service (requires the `aws-ses` feature in the infra crate)
    AwsSes,
    /// Logs messages instead of sending them
    Mock,
}

impl std::str::FromStr for EmailProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "smtp" => Ok(EmailProvider::Smtp),
            "aws-ses" | "ses" => Ok(EmailProvider::AwsSes),
            "mock" => Ok(EmailProvider::Mock),
            _ => Err(format!("unknown email provider '{}'", s)),
        }
    }
}

impl std::fmt::Display for EmailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailProvider::Smtp => write!(f, "smtp"),
            EmailProvider::AwsSes => write!(f, "aws-ses"),
            EmailProvider::Mock => write!(f, "mock"),
        }
    }
}

/// SMTP transport settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Use STARTTLS on a plain port instead of implicit TLS
    pub starttls: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            username: None,
            password: None,
            starttls: true,
        }
    }
}

/// Outbound email configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    /// Sender address (FROM_ADDRESS)
    pub sender_address: String,

    /// Display name shown next to the sender address (FROM_NAME)
    pub sender_name: String,

    /// Product name rendered into the message template (EMAIL_PRODUCT_NAME)
    pub product_name: String,

    /// Provider selection (EMAIL_PROVIDER)
    pub provider: EmailProvider,

    /// SMTP settings, used when `provider` is `Smtp`
    pub smtp: SmtpConfig,

    /// AWS region for SES (AWS_REGION)
    pub aws_region: String,
}

impl EmailConfig {
    pub fn new(sender_address: impl Into<String>) -> Self {
        Self {
            sender_address: sender_address.into(),
            sender_name: String::from("OTP"),
            product_name: String::from("your account"),
            provider: EmailProvider::default(),
            smtp: SmtpConfig::default(),
            aws_region: String::from("us-east-1"),
        }
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::new(required(lookup, "FROM_ADDRESS")?);
        let provider = parsed_or(lookup, "EMAIL_PROVIDER", defaults.provider)?;

        let smtp = SmtpConfig {
            host: lookup("SMTP_HOST").unwrap_or_default(),
            port: parsed_or(lookup, "SMTP_PORT", defaults.smtp.port)?,
            username: lookup("SMTP_USERNAME").filter(|v| !v.is_empty()),
            password: lookup("SMTP_PASSWORD").filter(|v| !v.is_empty()),
            starttls: parsed_or(lookup, "SMTP_STARTTLS", defaults.smtp.starttls)?,
        };

        if provider == EmailProvider::Smtp && smtp.host.trim().is_empty() {
            return Err(ConfigError::Missing {
                var: "SMTP_HOST".to_string(),
            });
        }

        Ok(Self {
            sender_name: lookup("FROM_NAME").unwrap_or_else(|| defaults.sender_name.clone()),
            product_name: lookup("EMAIL_PRODUCT_NAME")
                .unwrap_or_else(|| defaults.product_name.clone()),
            provider,
            smtp,
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| defaults.aws_region.clone()),
            ..defaults
        })
    }

    /// Mailbox string in `Name <address>` form
    pub fn sender_mailbox(&self) -> String {
        format!("{} <{}>", self.sender_name, self.sender_address)
    }
}
