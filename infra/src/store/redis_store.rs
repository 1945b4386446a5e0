//! Redis-backed record store
//!
//! Records live at `<store_ref>:otp:<identity_key>` as JSON. The insert and
//! the creation event on `<store_ref>:changes` are written by one Lua script,
//! so either both happen or neither does.

use async_trait::async_trait;
use redis::{AsyncCommands, Script};
use tracing::{debug, error};

use otp_core::domain::entities::OtpRecord;
use otp_core::errors::StoreError;
use otp_core::repositories::OtpRecordRepository;
use otp_shared::config::StoreConfig;

use crate::cache::RedisClient;
use crate::InfrastructureError;

use super::{EVENT_NAME_FIELD, EXPIRED_RECORD_RETENTION_SECS, NEW_IMAGE_FIELD};

/// Approximate cap on change stream length
const CHANGE_STREAM_MAX_LEN: u64 = 100_000;

/// KEYS[1] record key, KEYS[2] change stream
/// ARGV[1] record JSON, ARGV[2] key expiry (unix seconds), ARGV[3] stream cap
/// ARGV[4] event name field, ARGV[5] image field
const INSERT_SCRIPT: &str = r#"
if redis.call('SET', KEYS[1], ARGV[1], 'NX', 'EXAT', ARGV[2]) then
    redis.call('XADD', KEYS[2], 'MAXLEN', '~', ARGV[3], '*', ARGV[4], 'INSERT', ARGV[5], ARGV[1])
    return 1
end
return 0
"#;

/// Record store on Redis
pub struct RedisOtpStore {
    client: RedisClient,
    config: StoreConfig,
    insert_script: Script,
}

impl RedisOtpStore {
    pub fn new(client: RedisClient, config: StoreConfig) -> Self {
        Self {
            client,
            config,
            insert_script: Script::new(INSERT_SCRIPT),
        }
    }

    async fn insert(&self, record: &OtpRecord) -> Result<bool, InfrastructureError> {
        let key = self.config.record_key(&record.identity_key());
        let payload = serde_json::to_string(record)?;
        let key_expiry = record.expires_at + EXPIRED_RECORD_RETENTION_SECS;

        let mut conn = self.client.connection();
        let inserted: i64 = self
            .insert_script
            .key(&key)
            .key(self.config.change_stream_key())
            .arg(&payload)
            .arg(key_expiry)
            .arg(CHANGE_STREAM_MAX_LEN)
            .arg(EVENT_NAME_FIELD)
            .arg(NEW_IMAGE_FIELD)
            .invoke_async(&mut conn)
            .await?;

        Ok(inserted == 1)
    }

    async fn fetch(&self, identity_key: &str) -> Result<Option<OtpRecord>, InfrastructureError> {
        let mut conn = self.client.connection();
        let payload: Option<String> = conn.get(self.config.record_key(identity_key)).await?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OtpRecordRepository for RedisOtpStore {
    async fn put(&self, record: &OtpRecord) -> Result<(), StoreError> {
        match self.insert(record).await {
            Ok(true) => {
                debug!(expires_at = record.expires_at, "Stored passcode record");
                Ok(())
            }
            Ok(false) => Err(StoreError::Conflict {
                key: record.identity_key(),
            }),
            Err(e) => {
                error!(error = %e, "Redis insert failed");
                Err(e.into())
            }
        }
    }

    async fn get(&self, identity_key: &str) -> Result<Option<OtpRecord>, StoreError> {
        if identity_key.is_empty() || identity_key.contains(':') {
            return Err(StoreError::MalformedKey {
                key: identity_key.to_string(),
            });
        }

        self.fetch(identity_key).await.map_err(|e| {
            error!(error = %e, "Redis lookup failed");
            StoreError::from(e)
        })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        match self.client.health_check().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(StoreError::unavailable("unexpected PING reply")),
            Err(e) => Err(e.into()),
        }
    }
}
