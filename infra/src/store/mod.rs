//! Record store and change feed implementations.
//!
//! Both backends emit a creation event in the same step that writes the
//! record, so a stored record always has a matching event on the feed.

pub mod memory;

#[cfg(feature = "redis-store")]
pub mod redis_feed;
#[cfg(feature = "redis-store")]
pub mod redis_store;

pub use memory::{InMemoryChangeFeed, InMemoryOtpStore};

#[cfg(feature = "redis-store")]
pub use redis_feed::RedisChangeFeed;
#[cfg(feature = "redis-store")]
pub use redis_store::RedisOtpStore;

/// Seconds an expired record is kept before the store may drop it, so a late
/// verification still reports `Expired` instead of `NotFound`
pub const EXPIRED_RECORD_RETENTION_SECS: i64 = 300;

/// Stream field carrying the change kind
pub const EVENT_NAME_FIELD: &str = "eventName";

/// Stream field carrying the record image as JSON
pub const NEW_IMAGE_FIELD: &str = "newImage";
