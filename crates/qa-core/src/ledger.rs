//! Delivery de-duplication ledger
//!
//! Keyed by `(caller, message id)`. A record moves `absent -> running ->
//! <rendered reply>` and never goes back. Records carry no TTL, so a
//! redelivery always finds the terminal reply. A process that dies between
//! `try_begin` and `finish` leaves the record `running` for good.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::{ledger_key, KvStore};

/// Marker stored while a message is being resolved.
pub const RUNNING: &str = "running";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// This delivery owns the message and must call `finish`.
    Started,
    /// Another delivery is resolving the message right now.
    AlreadyRunning,
    /// The message was answered before; replay the stored reply.
    AlreadyFinished(String),
}

#[derive(Clone)]
pub struct DeliveryLedger {
    store: Arc<dyn KvStore>,
}

impl DeliveryLedger {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Claim a message for processing with a conditional insert of `running`.
    pub async fn try_begin(
        &self,
        caller_id: &str,
        message_id: &str,
    ) -> Result<DeliveryStatus, StoreError> {
        let key = ledger_key(caller_id);

        if self.store.hset_nx(&key, message_id, RUNNING).await? {
            debug!("Delivery {}/{} started", caller_id, message_id);
            return Ok(DeliveryStatus::Started);
        }

        // The field can only move forward, so whatever we read now is at
        // least as recent as the value that made hset_nx fail.
        let status = match self.store.hget(&key, message_id).await? {
            Some(value) if value == RUNNING => DeliveryStatus::AlreadyRunning,
            Some(reply) => DeliveryStatus::AlreadyFinished(reply),
            None => {
                return Err(StoreError::Command(format!(
                    "ledger entry {}/{} vanished",
                    caller_id, message_id
                )))
            }
        };

        info!(
            "Duplicate delivery {}/{}: {}",
            caller_id,
            message_id,
            match status {
                DeliveryStatus::AlreadyRunning => "still running",
                _ => "already answered",
            }
        );
        Ok(status)
    }

    /// Record the terminal reply of a started message.
    pub async fn finish(
        &self,
        caller_id: &str,
        message_id: &str,
        reply: &str,
    ) -> Result<(), StoreError> {
        self.store
            .hset(&ledger_key(caller_id), message_id, reply)
            .await?;
        debug!("Delivery {}/{} finished", caller_id, message_id);
        Ok(())
    }
}
