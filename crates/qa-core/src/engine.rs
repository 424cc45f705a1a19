//! Answer engine port

use async_trait::async_trait;

use crate::context::ConversationContext;
use crate::error::EngineError;

/// What the answer engine produced for one question.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineAnswer {
    pub text: String,
    pub context: Option<ConversationContext>,
}

impl EngineAnswer {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
        }
    }

    pub fn with_context(text: impl Into<String>, context: ConversationContext) -> Self {
        Self {
            text: text.into(),
            context: Some(context),
        }
    }
}

/// Natural-language answer engine. May be slow; may fail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerEngine: Send + Sync {
    async fn get_response(
        &self,
        question: &str,
        context: Option<ConversationContext>,
    ) -> Result<EngineAnswer, EngineError>;
}
