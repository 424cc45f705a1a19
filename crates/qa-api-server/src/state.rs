use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Duration;

use qa_core::{
    AnswerEngine, ConversationContextStore, DeliveryLedger, KnowledgeStore, KvStore, Resolver,
    StaticAnswerCache,
};

use crate::auth::ContextTokenManager;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub static_cache: StaticAnswerCache,
    pub resolver: Arc<Resolver>,
    pub contexts: ConversationContextStore,
    pub ledger: DeliveryLedger,
    pub knowledge: Arc<dyn KnowledgeStore>,
    pub context_tokens: Arc<ContextTokenManager>,
    /// Lifetime of per-caller context records on the webhook channel
    pub context_ttl: Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KvStore>,
        engine: Arc<dyn AnswerEngine>,
        knowledge: Arc<dyn KnowledgeStore>,
        context_tokens: ContextTokenManager,
    ) -> Self {
        let static_cache = StaticAnswerCache::new(store.clone());
        let resolver = Resolver::new(static_cache.clone(), engine);
        let context_ttl = context_tokens.ttl();

        Self {
            contexts: ConversationContextStore::new(store.clone()),
            ledger: DeliveryLedger::new(store.clone()),
            resolver: Arc::new(resolver),
            static_cache,
            store,
            knowledge,
            context_tokens: Arc::new(context_tokens),
            context_ttl,
        }
    }
}

impl FromRef<AppState> for Arc<dyn KvStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<dyn KnowledgeStore> {
    fn from_ref(state: &AppState) -> Self {
        state.knowledge.clone()
    }
}
