//! Change feed trait: the asynchronous boundary between the record store
//! and the notification dispatcher.

use async_trait::async_trait;

use crate::domain::events::ChangeDelivery;
use crate::errors::StoreError;

/// At-least-once stream of record creation events
///
/// Deliveries may repeat and may arrive in any order. A delivery that is
/// never acknowledged is handed out again by a later `poll`.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Fetch the next batch of deliveries. An empty batch means nothing is pending.
    async fn poll(&self) -> Result<Vec<ChangeDelivery>, StoreError>;

    /// Mark a delivery as handled so it is not redelivered
    async fn acknowledge(&self, delivery_id: &str) -> Result<(), StoreError>;
}
