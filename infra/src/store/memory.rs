//! Process-local record store and change feed
//!
//! Used for development (`STORE_BACKEND=memory`) and tests. Records and
//! pending deliveries are lost when the process exits.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;

use otp_core::domain::entities::OtpRecord;
use otp_core::domain::events::{ChangeDelivery, ChangeEvent};
use otp_core::errors::StoreError;
use otp_core::repositories::{ChangeFeed, OtpRecordRepository};
use otp_core::services::Clock;

use super::EXPIRED_RECORD_RETENTION_SECS;

/// Minimum seconds between sweeps of prunable records on insert
const PRUNE_INTERVAL_SECS: i64 = 60;

/// Time an unacknowledged delivery stays hidden before it is handed out again
pub const DEFAULT_REDELIVERY_DELAY: Duration = Duration::from_secs(60);

/// HashMap-backed record store that publishes a creation event per insert
pub struct InMemoryOtpStore {
    records: RwLock<HashMap<String, OtpRecord>>,
    events: mpsc::UnboundedSender<ChangeEvent>,
    clock: Arc<dyn Clock>,
    last_prune: AtomicI64,
}

impl InMemoryOtpStore {
    /// Create a store together with the feed carrying its creation events
    pub fn new(clock: Arc<dyn Clock>, batch_size: usize) -> (Self, InMemoryChangeFeed) {
        let (events, receiver) = mpsc::unbounded_channel();
        let store = Self {
            records: RwLock::new(HashMap::new()),
            events,
            last_prune: AtomicI64::new(clock.now()),
            clock,
        };
        (store, InMemoryChangeFeed::new(receiver, batch_size))
    }

    /// Number of stored records, expired ones included until pruned
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn is_prunable(&self, record: &OtpRecord, now: i64) -> bool {
        now > record.expires_at + EXPIRED_RECORD_RETENTION_SECS
    }

    fn prune(&self, records: &mut HashMap<String, OtpRecord>, now: i64) {
        let before = records.len();
        records.retain(|_, record| !self.is_prunable(record, now));
        self.last_prune.store(now, Ordering::SeqCst);
        debug!(
            pruned = before - records.len(),
            remaining = records.len(),
            "Pruned expired records"
        );
    }
}

#[async_trait]
impl OtpRecordRepository for InMemoryOtpStore {
    async fn put(&self, record: &OtpRecord) -> Result<(), StoreError> {
        let key = record.identity_key();
        let mut records = self.records.write().await;

        let now = self.clock.now();
        if now - self.last_prune.load(Ordering::SeqCst) >= PRUNE_INTERVAL_SECS {
            self.prune(&mut records, now);
        }

        if let Some(existing) = records.get(&key) {
            if !self.is_prunable(existing, now) {
                return Err(StoreError::Conflict { key });
            }
        }

        // Publish while holding the write lock so inserts and events stay paired
        self.events
            .send(ChangeEvent::created(record))
            .map_err(|_| StoreError::unavailable("change feed receiver dropped"))?;
        records.insert(key, record.clone());
        Ok(())
    }

    async fn get(&self, identity_key: &str) -> Result<Option<OtpRecord>, StoreError> {
        let now = self.clock.now();
        {
            let records = self.records.read().await;
            match records.get(identity_key) {
                None => return Ok(None),
                Some(record) if !self.is_prunable(record, now) => return Ok(Some(record.clone())),
                Some(_) => {}
            }
        }

        let mut records = self.records.write().await;
        self.prune(&mut records, now);
        Ok(None)
    }
}

struct InFlight {
    event: ChangeEvent,
    visible_at: Instant,
}

/// Feed over the in-process event channel
///
/// Deliveries stay in flight until acknowledged. An unacknowledged delivery
/// is handed out again once its redelivery delay has passed. Each poll takes
/// new events first and fills the rest of the batch with due redeliveries.
pub struct InMemoryChangeFeed {
    receiver: Mutex<mpsc::UnboundedReceiver<ChangeEvent>>,
    in_flight: Mutex<BTreeMap<u64, InFlight>>,
    next_id: AtomicU64,
    batch_size: usize,
    redelivery_delay: Duration,
}

impl InMemoryChangeFeed {
    fn new(receiver: mpsc::UnboundedReceiver<ChangeEvent>, batch_size: usize) -> Self {
        Self {
            receiver: Mutex::new(receiver),
            in_flight: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            batch_size: batch_size.max(1),
            redelivery_delay: DEFAULT_REDELIVERY_DELAY,
        }
    }

    /// Set how long an unacknowledged delivery waits before it is handed out again
    pub fn with_redelivery_delay(mut self, delay: Duration) -> Self {
        self.redelivery_delay = delay;
        self
    }

    /// Deliveries handed out but not yet acknowledged
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

#[async_trait]
impl ChangeFeed for InMemoryChangeFeed {
    async fn poll(&self) -> Result<Vec<ChangeDelivery>, StoreError> {
        let now = Instant::now();
        let visible_at = now + self.redelivery_delay;
        let mut in_flight = self.in_flight.lock().await;
        let mut receiver = self.receiver.lock().await;

        let mut fresh = Vec::new();
        while fresh.len() < self.batch_size {
            match receiver.try_recv() {
                Ok(event) => fresh.push((self.next_id.fetch_add(1, Ordering::SeqCst), event)),
                Err(_) => break,
            }
        }

        let mut deliveries: Vec<ChangeDelivery> = fresh
            .iter()
            .map(|(id, event)| ChangeDelivery::new(id.to_string(), event.clone()))
            .collect();

        let room = self.batch_size - deliveries.len();
        for (id, entry) in in_flight
            .iter_mut()
            .filter(|(_, entry)| entry.visible_at <= now)
            .take(room)
        {
            entry.visible_at = visible_at;
            deliveries.push(ChangeDelivery::new(id.to_string(), entry.event.clone()));
        }

        for (id, event) in fresh {
            in_flight.insert(id, InFlight { event, visible_at });
        }

        Ok(deliveries)
    }

    async fn acknowledge(&self, delivery_id: &str) -> Result<(), StoreError> {
        let id: u64 = delivery_id.parse().map_err(|_| StoreError::MalformedKey {
            key: delivery_id.to_string(),
        })?;
        self.in_flight.lock().await.remove(&id);
        Ok(())
    }
}
