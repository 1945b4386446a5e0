//! Deadlines for record store calls.

use std::future::Future;
use std::time::Duration;

use crate::errors::StoreError;

/// Run a store call, failing with `StoreError::Timeout` once `limit` elapses
pub async fn bounded<T, F>(operation: &str, limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout {
            operation: operation.to_string(),
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}
