use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/v1/otp`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IssueOtpRequest {
    /// Address the passcode is emailed to; syntax is checked by the issuance service
    #[validate(required, length(min = 1, max = 254))]
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `POST /api/v1/otp/verify`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[validate(required, length(min = 1))]
    #[serde(default)]
    pub session_token: Option<String>,

    #[validate(required, length(min = 1))]
    #[serde(default)]
    pub otp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedTokenData {
    pub token: String,
}

/// `{ "message": "OTP generated", "data": { "token": ... } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueOtpResponse {
    pub message: String,
    pub data: IssuedTokenData,
}

impl IssueOtpResponse {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            message: "OTP generated".to_string(),
            data: IssuedTokenData {
                token: token.into(),
            },
        }
    }
}
