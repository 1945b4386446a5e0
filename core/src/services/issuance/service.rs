//! Main issuance service implementation

use std::sync::Arc;

use otp_shared::utils::{is_valid_email, mask_email};

use crate::domain::entities::OtpRecord;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::OtpRecordRepository;
use crate::services::clock::Clock;
use crate::services::credentials::{generate_otp, generate_session_token};
use crate::services::deadline::bounded;

use super::config::IssuanceServiceConfig;
use super::types::IssuedOtp;

/// Issues passcodes and writes them to the record store
pub struct IssuanceService<R: OtpRecordRepository + ?Sized> {
    store: Arc<R>,
    clock: Arc<dyn Clock>,
    config: IssuanceServiceConfig,
}

impl<R: OtpRecordRepository + ?Sized> IssuanceService<R> {
    pub fn new(store: Arc<R>, clock: Arc<dyn Clock>, config: IssuanceServiceConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Issue a new passcode for `email`
    ///
    /// Performs exactly one store write. The email notification is not sent
    /// here; it follows from the store's creation event.
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedOtp)` - Session token and expiry of the new record
    /// * `Err(DomainError::InvalidInput)` - `email` is not a valid address; nothing is written
    /// * `Err(DomainError::Storage)` - The write failed or exceeded the store deadline
    pub async fn issue(&self, email: &str) -> DomainResult<IssuedOtp> {
        if !is_valid_email(email) {
            tracing::warn!(
                email = %mask_email(email),
                event = "otp_issue_rejected",
                "Rejected passcode request with invalid email"
            );
            return Err(DomainError::invalid_input(
                "email",
                "not a valid email address",
            ));
        }

        let session_token = generate_session_token();
        let otp = generate_otp(self.config.otp_length);
        let record = OtpRecord::issue(
            session_token,
            otp,
            email,
            self.clock.now(),
            self.config.ttl_seconds(),
        );

        bounded("put", self.config.store_timeout, self.store.put(&record))
            .await
            .map_err(|e| {
                tracing::error!(
                    email = %mask_email(email),
                    error = %e,
                    event = "otp_storage_failed",
                    "Failed to persist passcode record"
                );
                DomainError::from(e)
            })?;

        tracing::info!(
            email = %mask_email(email),
            expires_at = record.expires_at,
            event = "otp_issued",
            "Issued new passcode"
        );

        Ok(IssuedOtp {
            session_token: record.session_token,
            expires_at: record.expires_at,
        })
    }
}
