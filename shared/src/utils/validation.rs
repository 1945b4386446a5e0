//! Common validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest accepted address (RFC 5321 forward-path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Longest accepted local part
pub const MAX_LOCAL_PART_LENGTH: usize = 64;

/// Longest accepted DNS label
pub const MAX_DOMAIN_LABEL_LENGTH: usize = 63;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[-!#$%&'*+/0-9=?A-Z^_a-z`{|}~](\.?[-!#$%&'*+/0-9=?A-Z^_a-z`{|}~])*@[a-zA-Z0-9](-*\.?[a-zA-Z0-9])*\.[a-zA-Z](-?[a-zA-Z0-9])+$",
    )
    .expect("email pattern is a valid regex")
});

/// Check that an address is a syntactically valid email (RFC 5322 dot-atom form).
///
/// Rejects empty input, missing `@`, quoted local parts, consecutive or
/// leading/trailing dots, domains without a dot and over-long labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.len() > MAX_LOCAL_PART_LENGTH {
        return false;
    }

    if domain
        .split('.')
        .any(|label| label.len() > MAX_DOMAIN_LABEL_LENGTH)
    {
        return false;
    }

    EMAIL_REGEX.is_match(email)
}

/// Mask an email address for logging.
///
/// Keeps the first character of the local part and the whole domain:
/// `alice@example.com` becomes `a****@example.com`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}****@{}", first, domain)
        }
        None => "****".to_string(),
    }
}
