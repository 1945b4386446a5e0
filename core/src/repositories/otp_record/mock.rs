//! Mock implementation of OtpRecordRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::entities::OtpRecord;
use crate::errors::StoreError;

use super::r#trait::OtpRecordRepository;

/// Mock record store backed by a HashMap
pub struct MockOtpRecordRepository {
    records: Arc<RwLock<HashMap<String, OtpRecord>>>,
    should_fail: AtomicBool,
    delay: RwLock<Option<Duration>>,
    writes: AtomicUsize,
    reads: AtomicUsize,
}

impl MockOtpRecordRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            should_fail: AtomicBool::new(false),
            delay: RwLock::new(None),
            writes: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Delay every subsequent call, to exercise store deadlines
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    /// Number of successful writes
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of read attempts
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub async fn records(&self) -> Vec<OtpRecord> {
        self.records.read().await.values().cloned().collect()
    }

    pub async fn insert(&self, record: OtpRecord) {
        self.records
            .write()
            .await
            .insert(record.identity_key(), record);
    }

    async fn simulate(&self) -> Result<(), StoreError> {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("mock store failure"));
        }
        Ok(())
    }
}

impl Default for MockOtpRecordRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpRecordRepository for MockOtpRecordRepository {
    async fn put(&self, record: &OtpRecord) -> Result<(), StoreError> {
        self.simulate().await?;

        let key = record.identity_key();
        let mut records = self.records.write().await;
        if records.contains_key(&key) {
            return Err(StoreError::Conflict { key });
        }
        records.insert(key, record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, identity_key: &str) -> Result<Option<OtpRecord>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.simulate().await?;

        Ok(self.records.read().await.get(identity_key).cloned())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.simulate().await
    }
}
