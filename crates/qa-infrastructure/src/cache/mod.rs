//! Shared key-value store backends

mod redis_store;

pub use redis_store::RedisStore;
