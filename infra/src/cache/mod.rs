//! Redis connection handling shared by the record store and the change feed.

pub mod redis_client;

pub use redis_client::RedisClient;
