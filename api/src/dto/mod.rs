pub mod otp;

pub use otp::{IssueOtpRequest, IssueOtpResponse, IssuedTokenData, VerifyOtpRequest};
pub use otp_shared::errors::{ErrorResponse, MessageResponse};
