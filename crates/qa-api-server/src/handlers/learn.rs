use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use qa_core::{KnowledgeStore, LearnedPair, LearnedRecord};

use crate::utils::error::ApiError;
use crate::utils::json::AppJson;

/// Persist a learned question/answer pair.
///
/// The pair lands in the knowledge base only; the static cache is filled
/// from static pairs at startup and is not touched here.
pub async fn learn_handler(
    State(knowledge): State<Arc<dyn KnowledgeStore>>,
    AppJson(pair): AppJson<LearnedPair>,
) -> Result<Json<LearnedRecord>, ApiError> {
    pair.validate()?;

    let record = knowledge.learn(pair).await?;
    tracing::debug!("Learn request stored as {}", record.id);

    Ok(Json(record))
}
