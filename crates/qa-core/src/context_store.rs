use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::context::ConversationContext;
use crate::error::StoreError;
use crate::store::{context_key, KvStore};

/// Per-caller conversation context with store-level expiry.
///
/// Writes replace the previous context wholesale and restart its TTL.
#[derive(Clone)]
pub struct ConversationContextStore {
    store: Arc<dyn KvStore>,
}

impl ConversationContextStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Current context of a caller, `None` if absent, expired or unreadable.
    pub async fn get(&self, caller_id: &str) -> Result<Option<ConversationContext>, StoreError> {
        let Some(raw) = self.store.get(&context_key(caller_id)).await? else {
            return Ok(None);
        };

        let context = ConversationContext::from_json(&raw);
        if context.is_none() {
            warn!("Discarding unreadable context for caller {}", caller_id);
        }
        Ok(context)
    }

    pub async fn put(
        &self,
        caller_id: &str,
        context: &ConversationContext,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let raw = context
            .to_json()
            .map_err(|e| StoreError::Command(format!("context encoding failed: {}", e)))?;

        self.store.set_ex(&context_key(caller_id), &raw, ttl).await?;
        debug!("Stored context for caller {} (ttl {:?})", caller_id, ttl);
        Ok(())
    }
}
