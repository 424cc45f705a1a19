//! # QA Core
//!
//! Response resolution and delivery idempotency for the question-answering
//! front door.
//!
//! - `store`: shared key-value port plus the in-process `MemoryStore`
//! - `static_cache`: pre-computed question/answer lookups and the bulk loader
//! - `context_store`: per-caller conversation context with expiry
//! - `ledger`: per-message de-duplication for at-least-once channels
//! - `resolver`: decides between the static cache and the answer engine

pub mod context;
pub mod context_store;
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod ledger;
pub mod resolver;
pub mod static_cache;
pub mod store;

pub use context::ConversationContext;
pub use context_store::ConversationContextStore;
pub use engine::{AnswerEngine, EngineAnswer};
pub use error::{EngineError, KnowledgeError, LoadError, StoreError};
pub use knowledge::{KnowledgeStore, LearnedPair, LearnedRecord, StaticPair};
pub use ledger::{DeliveryLedger, DeliveryStatus};
pub use resolver::{AnswerSource, Resolution, Resolver};
pub use static_cache::{LoadReport, StaticAnswerCache};
pub use store::{KvStore, MemoryStore};
