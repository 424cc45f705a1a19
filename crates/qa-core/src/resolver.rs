//! Resolution engine
//!
//! Decides, per question, whether the static cache may answer or the answer
//! engine must be asked, and which context (if any) the caller should carry
//! into the next turn. Stateless; safe to share across requests.

use std::sync::Arc;
use tracing::{error, info};

use crate::context::ConversationContext;
use crate::engine::AnswerEngine;
use crate::static_cache::StaticAnswerCache;

/// Apology sent back when the answer engine fails.
pub const ENGINE_ERROR_TEMPLATE: &str = "机器人接口发生了错误，错误信息是:{}";

pub fn engine_error_answer(detail: &str) -> String {
    ENGINE_ERROR_TEMPLATE.replace("{}", detail)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    StaticCache,
    Engine,
    EngineFailure,
}

/// Answer plus the context to persist for the next turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub text: String,
    pub context: Option<ConversationContext>,
    pub source: AnswerSource,
}

#[derive(Clone)]
pub struct Resolver {
    cache: StaticAnswerCache,
    engine: Arc<dyn AnswerEngine>,
}

impl Resolver {
    pub fn new(cache: StaticAnswerCache, engine: Arc<dyn AnswerEngine>) -> Self {
        Self { cache, engine }
    }

    /// Resolve a question. Never fails: engine errors become an apology.
    pub async fn resolve(
        &self,
        question: &str,
        prior: Option<&ConversationContext>,
    ) -> Resolution {
        // A dialog in progress must not be interrupted by a static answer.
        if let Some(context) = prior.filter(|c| c.is_active_dialog()) {
            return self.ask_engine(question, Some(context.clone())).await;
        }

        if let Some(answer) = self.cache.lookup(question).await {
            info!("Get the answer to the {:?} question from the cache", question);
            return Resolution {
                text: answer,
                context: None,
                source: AnswerSource::StaticCache,
            };
        }

        self.ask_engine(question, None).await
    }

    async fn ask_engine(
        &self,
        question: &str,
        context: Option<ConversationContext>,
    ) -> Resolution {
        match self.engine.get_response(question, context).await {
            Ok(answer) => Resolution {
                text: answer.text,
                context: answer.context.filter(|c| !c.is_empty()),
                source: AnswerSource::Engine,
            },
            Err(e) => {
                error!("Answer engine failed for {:?}: {}", question, e);
                Resolution {
                    text: engine_error_answer(&e.to_string()),
                    context: None,
                    source: AnswerSource::EngineFailure,
                }
            }
        }
    }
}
