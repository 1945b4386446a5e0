//! Message template for passcode emails

/// A rendered passcode email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpEmail {
    pub subject: String,
    pub html_body: String,
}

/// Renders the passcode email
#[derive(Debug, Clone)]
pub struct OtpEmailTemplate {
    product_name: String,
    ttl_minutes: Option<u32>,
}

impl OtpEmailTemplate {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            ttl_minutes: None,
        }
    }

    /// Mention the passcode lifetime in the message body
    pub fn with_ttl_hint(mut self, ttl_minutes: u32) -> Self {
        self.ttl_minutes = Some(ttl_minutes);
        self
    }

    pub fn render(&self, otp: &str) -> OtpEmail {
        let product = escape_html(&self.product_name);
        let expiry = match self.ttl_minutes {
            Some(1) => "<p>This code expires in 1 minute.</p>\n".to_string(),
            Some(minutes) => format!("<p>This code expires in {} minutes.</p>\n", minutes),
            None => String::new(),
        };

        let html_body = format!(
            "<!DOCTYPE html>\n<html>\n<body>\n<p>Use this code to confirm your request on {product}</p>\n<h1>{otp}</h1>\n{expiry}</body>\n</html>\n",
            product = product,
            otp = escape_html(otp),
            expiry = expiry,
        );

        OtpEmail {
            subject: format!("Your one-time code for {}", self.product_name),
            html_body,
        }
    }
}

impl Default for OtpEmailTemplate {
    fn default() -> Self {
        Self::new("your account")
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
