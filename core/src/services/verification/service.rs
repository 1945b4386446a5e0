//! Main verification service implementation

use std::sync::Arc;

use crate::domain::entities::{identity_key, is_well_formed_pair};
use crate::errors::{DomainError, DomainResult, StoreError};
use crate::repositories::OtpRecordRepository;
use crate::services::clock::Clock;
use crate::services::deadline::bounded;

use super::config::VerificationServiceConfig;
use super::types::VerificationOutcome;

/// Verifies submitted session token and passcode pairs
pub struct VerificationService<R: OtpRecordRepository + ?Sized> {
    store: Arc<R>,
    clock: Arc<dyn Clock>,
    config: VerificationServiceConfig,
}

impl<R: OtpRecordRepository + ?Sized> VerificationService<R> {
    pub fn new(store: Arc<R>, clock: Arc<dyn Clock>, config: VerificationServiceConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Check a session token and passcode pair
    ///
    /// Performs at most one store read and never modifies the store.
    ///
    /// # Returns
    ///
    /// * `Ok(VerificationOutcome)` - Verified, Expired or NotFound
    /// * `Err(DomainError::InvalidInput)` - Either value is empty
    /// * `Err(DomainError::Storage)` - The lookup failed or exceeded the store deadline
    pub async fn verify(&self, session_token: &str, otp: &str) -> DomainResult<VerificationOutcome> {
        if session_token.is_empty() {
            return Err(DomainError::invalid_input("sessionToken", "must not be empty"));
        }
        if otp.is_empty() {
            return Err(DomainError::invalid_input("otp", "must not be empty"));
        }

        if !is_well_formed_pair(session_token, otp) {
            tracing::info!(event = "otp_not_found", "Rejected pair outside the issued charset");
            return Ok(VerificationOutcome::NotFound);
        }

        let key = identity_key(session_token, otp);
        let record = bounded("get", self.config.store_timeout, self.store.get(&key))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    event = "otp_lookup_failed",
                    "Failed to look up passcode record"
                );
                DomainError::from(e)
            })?;

        let Some(record) = record else {
            tracing::info!(event = "otp_not_found", "No record for submitted pair");
            return Ok(VerificationOutcome::NotFound);
        };

        let now = self.clock.now();
        if record.is_valid_at(now) {
            tracing::info!(
                remaining_seconds = record.remaining_seconds(now),
                event = "otp_verified",
                "Passcode verified"
            );
            Ok(VerificationOutcome::Verified)
        } else {
            tracing::info!(
                expired_for = now - record.expires_at,
                event = "otp_expired",
                "Passcode presented after expiry"
            );
            Ok(VerificationOutcome::Expired)
        }
    }

    /// Whether the record store answers within the store deadline
    pub async fn store_health(&self) -> Result<(), StoreError> {
        bounded("health_check", self.config.store_timeout, self.store.health_check()).await
    }
}
