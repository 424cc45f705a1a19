//! Shared key-value store port
//!
//! All cross-request coordination goes through this trait. Each call must be
//! atomic on its own; nothing here spans multiple keys.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::StoreError;

/// Hash holding pre-computed question -> answer pairs.
pub const STATIC_QA_KEY: &str = "static_qa";

/// String key holding a caller's JSON-encoded conversation context.
pub fn context_key(caller_id: &str) -> String {
    format!("{}_context", caller_id)
}

/// Hash holding a caller's message-id -> delivery record entries.
pub fn ledger_key(caller_id: &str) -> String {
    format!("{}_asked_question", caller_id)
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;

    /// Set the field only when it does not exist yet. Returns `true` if written.
    async fn hset_nx(&self, key: &str, field: &str, value: &str) -> Result<bool, StoreError>;

    async fn hexists(&self, key: &str, field: &str) -> Result<bool, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value and reset its expiry.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
