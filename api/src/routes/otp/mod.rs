//! Passcode route handlers
//!
//! - `POST /api/v1/otp` issues a passcode and returns its session token
//! - `POST /api/v1/otp/verify` checks a session token and passcode pair

pub mod issue;
pub mod verify;

use std::sync::Arc;

use otp_core::repositories::OtpRecordRepository;
use otp_core::services::{IssuanceService, VerificationService};

pub use issue::issue_otp;
pub use verify::verify_otp;

/// Shared state for the passcode handlers
pub struct AppState<R: OtpRecordRepository + ?Sized> {
    pub issuance: Arc<IssuanceService<R>>,
    pub verification: Arc<VerificationService<R>>,
}

impl<R: OtpRecordRepository + ?Sized> AppState<R> {
    pub fn new(issuance: Arc<IssuanceService<R>>, verification: Arc<VerificationService<R>>) -> Self {
        Self {
            issuance,
            verification,
        }
    }
}
