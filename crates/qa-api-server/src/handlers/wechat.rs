use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};

use qa_core::{DeliveryStatus, StoreError};

use crate::models::WechatQuery;
use crate::state::AppState;
use crate::utils::error::ApiError;
use crate::wechat::{InboundMessage, TextReply};

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Endpoint verification handshake.
pub async fn verify_handler(Query(query): Query<WechatQuery>) -> String {
    query.echostr.unwrap_or_default()
}

/// Asynchronous channel: the platform may redeliver a push several times,
/// so each `(caller, message)` pair is answered at most once.
pub async fn message_handler(
    State(state): State<AppState>,
    Query(query): Query<WechatQuery>,
    body: String,
) -> Result<Response, ApiError> {
    let message = InboundMessage::parse(&body)?;

    let caller_id = match query.openid.as_deref() {
        Some(openid) if !openid.is_empty() => openid.to_string(),
        _ => message.from_user.clone(),
    };

    let Some(question) = message.text() else {
        tracing::debug!("Ignoring {} message from {}", message.msg_type, caller_id);
        return Ok(StatusCode::OK.into_response());
    };

    let message_id = message.delivery_id();

    match state.ledger.try_begin(&caller_id, &message_id).await? {
        DeliveryStatus::AlreadyRunning => {
            // Empty non-success reply; the platform retries and a later
            // delivery picks up the finished answer.
            Ok(StatusCode::SERVICE_UNAVAILABLE.into_response())
        }
        DeliveryStatus::AlreadyFinished(reply) => Ok(xml(reply)),
        DeliveryStatus::Started => {
            let reply = answer_message(&state, &caller_id, &message_id, question, &message)
                .await
                .inspect_err(|e| {
                    tracing::warn!(
                        "Message {} from {} stays running after store failure: {}",
                        message_id,
                        caller_id,
                        e
                    )
                })?;

            Ok(xml(reply))
        }
    }
}

/// Resolve a claimed message and record its reply in the ledger.
async fn answer_message(
    state: &AppState,
    caller_id: &str,
    message_id: &str,
    question: &str,
    message: &InboundMessage,
) -> Result<String, StoreError> {
    let prior = state.contexts.get(caller_id).await?;
    let resolution = state.resolver.resolve(question, prior.as_ref()).await;

    if let Some(context) = &resolution.context {
        state
            .contexts
            .put(caller_id, context, state.context_ttl)
            .await?;
    }

    let reply = TextReply::new(&resolution.text, message).render();
    state.ledger.finish(caller_id, message_id, &reply).await?;

    tracing::info!(
        "Answered message {} from {} via {:?}",
        message_id,
        caller_id,
        resolution.source
    );

    Ok(reply)
}

fn xml(body: String) -> Response {
    ([(CONTENT_TYPE, XML_CONTENT_TYPE)], body).into_response()
}
