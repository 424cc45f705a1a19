use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

use crate::models::{QuestionRequest, QuestionResponse};
use crate::state::AppState;
use crate::utils::error::ApiError;
use crate::utils::json::AppJson;

/// Synchronous channel: context rides in a signed cookie held by the client.
pub async fn question_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(request): AppJson<QuestionRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;

    let prior = state.context_tokens.context_from_headers(&headers);
    let resolution = state.resolver.resolve(&request.question, prior.as_ref()).await;

    tracing::debug!(
        "Resolved question via {:?} (context: {})",
        resolution.source,
        resolution.context.is_some()
    );

    let mut response = Json(QuestionResponse {
        text: resolution.text,
    })
    .into_response();

    // No new context means the client keeps whatever token it holds.
    if let Some(context) = resolution.context {
        match state.context_tokens.set_cookie(&context) {
            Ok(cookie) => {
                response.headers_mut().insert(SET_COOKIE, cookie);
            }
            Err(e) => tracing::error!("Failed to issue context cookie: {}", e),
        }
    }

    Ok(response)
}
