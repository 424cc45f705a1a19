use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::KvStore;
use crate::error::StoreError;

enum Value {
    Str(String),
    Hash(HashMap<String, String>),
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>, // None = no expiry
}

impl Entry {
    fn hash() -> Self {
        Self {
            value: Value::Hash(HashMap::new()),
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-process store with the same per-key atomicity as the Redis backend.
///
/// Every mutation runs under the shard lock of its key, so `hset_nx` is a
/// true check-and-set. Expired keys are removed lazily on access.
#[derive(Default)]
pub struct MemoryStore {
    map: DashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.map.iter().filter(|r| !r.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of a hash, empty if the key is missing.
    pub fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        self.read(key, |value| match value {
            Value::Hash(h) => Ok(h.clone()),
            Value::Str(_) => Err(StoreError::WrongType(key.to_string())),
        })
        .unwrap_or_else(|| Ok(HashMap::new()))
    }

    fn read<R>(&self, key: &str, f: impl FnOnce(&Value) -> R) -> Option<R> {
        let now = Instant::now();
        let g = self.map.get(key)?;
        if g.is_expired(now) {
            drop(g);
            self.map.remove_if(key, |_, e| e.is_expired(now));
            return None;
        }
        Some(f(&g.value))
    }

    fn with_hash<R>(
        &self,
        key: &str,
        f: impl FnOnce(&mut HashMap<String, String>) -> R,
    ) -> Result<R, StoreError> {
        let now = Instant::now();
        let mut entry = self.map.entry(key.to_string()).or_insert_with(Entry::hash);
        if entry.is_expired(now) {
            *entry = Entry::hash();
        }
        match &mut entry.value {
            Value::Hash(h) => Ok(f(h)),
            Value::Str(_) => Err(StoreError::WrongType(key.to_string())),
        }
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        self.read(key, |value| match value {
            Value::Hash(h) => Ok(h.get(field).cloned()),
            Value::Str(_) => Err(StoreError::WrongType(key.to_string())),
        })
        .unwrap_or(Ok(None))
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.with_hash(key, |h| {
            h.insert(field.to_string(), value.to_string());
        })
    }

    async fn hset_nx(&self, key: &str, field: &str, value: &str) -> Result<bool, StoreError> {
        self.with_hash(key, |h| {
            if h.contains_key(field) {
                false
            } else {
                h.insert(field.to_string(), value.to_string());
                true
            }
        })
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool, StoreError> {
        self.read(key, |value| match value {
            Value::Hash(h) => Ok(h.contains_key(field)),
            Value::Str(_) => Err(StoreError::WrongType(key.to_string())),
        })
        .unwrap_or(Ok(false))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.read(key, |value| match value {
            Value::Str(s) => Ok(Some(s.clone())),
            Value::Hash(_) => Err(StoreError::WrongType(key.to_string())),
        })
        .unwrap_or(Ok(None))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.map.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
