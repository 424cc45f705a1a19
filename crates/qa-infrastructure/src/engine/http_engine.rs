use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use qa_core::{AnswerEngine, ConversationContext, EngineAnswer, EngineError};

#[derive(Debug, Serialize)]
struct ResponseRequest<'a> {
    question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a ConversationContext>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    text: String,
    #[serde(default)]
    context: Option<serde_json::Value>,
}

/// Client for an answer engine exposing `POST {base_url}/response`.
#[derive(Clone)]
pub struct HttpAnswerEngine {
    client: Client,
    base_url: String,
}

impl HttpAnswerEngine {
    /// `timeout` of `None` leaves the call unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, EngineError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| EngineError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AnswerEngine for HttpAnswerEngine {
    async fn get_response(
        &self,
        question: &str,
        context: Option<ConversationContext>,
    ) -> Result<EngineAnswer, EngineError> {
        debug!("Asking answer engine (with_context={})", context.is_some());

        let request = ResponseRequest {
            question,
            context: context.as_ref(),
        };

        let response = self
            .client
            .post(format!("{}/response", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::Request(format!("Failed to call answer engine: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Request(format!(
                "Answer engine error: {} - {}",
                status, body
            )));
        }

        let body: ResponseBody = response.json().await.map_err(|e| {
            EngineError::InvalidResponse(format!("Failed to parse answer engine response: {}", e))
        })?;

        Ok(EngineAnswer {
            text: body.text,
            context: body.context.and_then(ConversationContext::from_value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_first_turn_sends_question_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/response"))
            .and(body_json(json!({"question": "你好"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Hi"})))
            .expect(1)
            .mount(&server)
            .await;

        let engine = HttpAnswerEngine::new(&server.uri(), None).unwrap();
        let answer = engine.get_response("你好", None).await.unwrap();

        assert_eq!(answer, EngineAnswer::text("Hi"));
    }

    #[tokio::test]
    async fn test_context_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/response"))
            .and(body_json(json!({
                "question": "明天呢",
                "context": {"domain": "weather", "city": "上海"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "明天多云",
                "context": {"domain": "weather", "city": "上海", "date": "tomorrow"}
            })))
            .mount(&server)
            .await;

        let engine = HttpAnswerEngine::new(&format!("{}/", server.uri()), None).unwrap();
        let prior = ConversationContext::from_value(json!({"domain": "weather", "city": "上海"}));
        let answer = engine.get_response("明天呢", prior).await.unwrap();

        assert_eq!(answer.text, "明天多云");
        let context = answer.context.unwrap();
        assert_eq!(context.fields().get("date"), Some(&json!("tomorrow")));
    }

    #[tokio::test]
    async fn test_empty_context_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"text": "ok", "context": {}})),
            )
            .mount(&server)
            .await;

        let engine = HttpAnswerEngine::new(&server.uri(), None).unwrap();
        let answer = engine.get_response("q", None).await.unwrap();
        assert_eq!(answer.context, None);
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let engine = HttpAnswerEngine::new(&server.uri(), None).unwrap();
        let err = engine.get_response("q", None).await.unwrap_err();
        assert!(err.to_string().contains("model not loaded"));
    }

    #[tokio::test]
    async fn test_timeout_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"text": "late"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let engine =
            HttpAnswerEngine::new(&server.uri(), Some(Duration::from_millis(50))).unwrap();
        let err = engine.get_response("q", None).await.unwrap_err();
        assert!(matches!(err, EngineError::Request(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let engine = HttpAnswerEngine::new(&server.uri(), None).unwrap();
        let err = engine.get_response("q", None).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidResponse(_)));
    }
}
