//! Record store trait for issued passcodes.

use async_trait::async_trait;

use crate::domain::entities::OtpRecord;
use crate::errors::StoreError;

/// Keyed, expiry-aware persistence for [`OtpRecord`]s
///
/// Records are addressed by their identity key (`<session_token>_<otp>`) and
/// are immutable once written. Implementations must write the record and its
/// expiry in one atomic operation.
#[async_trait]
pub trait OtpRecordRepository: Send + Sync {
    /// Insert a new record
    ///
    /// # Returns
    /// * `Ok(())` - Record persisted together with its expiry
    /// * `Err(StoreError::Conflict)` - A record already exists under the same identity key
    /// * `Err(StoreError)` - The store could not complete the write
    async fn put(&self, record: &OtpRecord) -> Result<(), StoreError>;

    /// Look up a record by identity key
    ///
    /// Expired records may still be returned; the caller decides validity.
    async fn get(&self, identity_key: &str) -> Result<Option<OtpRecord>, StoreError>;

    /// Check that the store is reachable
    ///
    /// Process-local stores are always reachable.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
