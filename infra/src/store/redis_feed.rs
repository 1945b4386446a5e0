//! Change feed over a Redis stream consumer group
//!
//! New entries are read with `XREADGROUP ... >`. Entries that were handed out
//! but never acknowledged become claimable after `claim_idle_ms` and are
//! picked up again with `XAUTOCLAIM`, which gives at-least-once delivery even
//! when a consumer dies mid-batch. Reclaimed entries only fill the room new
//! entries leave in a batch.

use async_trait::async_trait;
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, Value};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use otp_core::domain::events::{ChangeDelivery, ChangeEvent, ChangeKind, RecordImage};
use otp_core::errors::StoreError;
use otp_core::repositories::ChangeFeed;
use otp_shared::config::{DispatcherConfig, StoreConfig};

use crate::cache::RedisClient;
use crate::InfrastructureError;

use super::{EVENT_NAME_FIELD, NEW_IMAGE_FIELD};

/// Consumer-group reader on the change stream
pub struct RedisChangeFeed {
    client: RedisClient,
    stream: String,
    group: String,
    consumer: String,
    batch_size: usize,
    claim_idle_ms: u64,
}

impl RedisChangeFeed {
    /// Create the feed, creating the stream and consumer group when missing
    pub async fn new(
        client: RedisClient,
        store: &StoreConfig,
        dispatcher: &DispatcherConfig,
    ) -> Result<Self, InfrastructureError> {
        let feed = Self {
            client,
            stream: store.change_stream_key(),
            group: dispatcher.group.clone(),
            consumer: dispatcher.consumer.clone(),
            batch_size: dispatcher.batch_size.max(1),
            claim_idle_ms: dispatcher.claim_idle_ms,
        };
        feed.ensure_group().await?;
        Ok(feed)
    }

    async fn ensure_group(&self) -> Result<(), InfrastructureError> {
        let mut conn = self.client.connection();
        let created: redis::RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.stream)
            .arg(&self.group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match created {
            Ok(()) => {
                info!(stream = %self.stream, group = %self.group, "Created change stream consumer group");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Up to `count` entries pending longer than the claim idle time, reassigned to this consumer
    async fn claim_stale(&self, count: usize) -> Result<Vec<ChangeDelivery>, InfrastructureError> {
        let mut conn = self.client.connection();
        let reply: Vec<Value> = redis::cmd("XAUTOCLAIM")
            .arg(&self.stream)
            .arg(&self.group)
            .arg(&self.consumer)
            .arg(self.claim_idle_ms)
            .arg("0-0")
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await?;

        let entries = match reply.get(1) {
            Some(Value::Bulk(entries)) => entries,
            _ => return Ok(Vec::new()),
        };

        let mut deliveries = Vec::with_capacity(entries.len());
        for entry in entries {
            // Entries trimmed from the stream come back as nil
            let Ok((id, fields)) = redis::from_redis_value::<(String, HashMap<String, String>)>(entry) else {
                continue;
            };
            if let Some(delivery) = self.decode(id, &fields).await {
                deliveries.push(delivery);
            }
        }

        if !deliveries.is_empty() {
            info!(count = deliveries.len(), event = "deliveries_reclaimed", "Reclaimed unacknowledged deliveries");
        }
        Ok(deliveries)
    }

    async fn read_new(&self, count: usize) -> Result<Vec<ChangeDelivery>, InfrastructureError> {
        let mut conn = self.client.connection();
        let options = StreamReadOptions::default()
            .group(&self.group, &self.consumer)
            .count(count);
        let reply: Option<StreamReadReply> = conn
            .xread_options(&[&self.stream], &[">"], &options)
            .await?;

        let mut deliveries = Vec::new();
        for key in reply.map(|r| r.keys).unwrap_or_default() {
            for entry in key.ids {
                let fields: HashMap<String, String> = entry
                    .map
                    .iter()
                    .filter_map(|(field, value)| {
                        redis::from_redis_value::<String>(value)
                            .ok()
                            .map(|v| (field.clone(), v))
                    })
                    .collect();
                if let Some(delivery) = self.decode(entry.id, &fields).await {
                    deliveries.push(delivery);
                }
            }
        }
        Ok(deliveries)
    }

    /// Turn a stream entry into a delivery
    ///
    /// Entries whose kind cannot be read are acknowledged and dropped, since
    /// no consumer will ever be able to handle them. A missing or unparsable
    /// image is passed on as an event without attributes.
    async fn decode(&self, id: String, fields: &HashMap<String, String>) -> Option<ChangeDelivery> {
        let kind = fields
            .get(EVENT_NAME_FIELD)
            .and_then(|name| name.parse::<ChangeKind>().ok());

        let Some(kind) = kind else {
            warn!(delivery_id = %id, event = "delivery_dropped", "Change stream entry has no readable event name");
            if let Err(e) = self.ack(&id).await {
                warn!(delivery_id = %id, error = %e, "Failed to acknowledge unreadable entry");
            }
            return None;
        };

        let new_image = fields.get(NEW_IMAGE_FIELD).and_then(|json| {
            serde_json::from_str::<RecordImage>(json)
                .map_err(|e| warn!(delivery_id = %id, error = %e, "Unreadable record image"))
                .ok()
        });

        Some(ChangeDelivery::new(id, ChangeEvent { kind, new_image }))
    }

    async fn ack(&self, delivery_id: &str) -> Result<(), InfrastructureError> {
        let mut conn = self.client.connection();
        let _: i64 = conn.xack(&self.stream, &self.group, &[delivery_id]).await?;
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for RedisChangeFeed {
    async fn poll(&self) -> Result<Vec<ChangeDelivery>, StoreError> {
        // New entries first so stuck ones cannot fill every batch
        let mut deliveries = self.read_new(self.batch_size).await.map_err(StoreError::from)?;

        let remaining = self.batch_size.saturating_sub(deliveries.len());
        if remaining > 0 {
            deliveries.extend(self.claim_stale(remaining).await.map_err(StoreError::from)?);
        }

        debug!(count = deliveries.len(), "Polled change stream");
        Ok(deliveries)
    }

    async fn acknowledge(&self, delivery_id: &str) -> Result<(), StoreError> {
        self.ack(delivery_id).await.map_err(StoreError::from)
    }
}
