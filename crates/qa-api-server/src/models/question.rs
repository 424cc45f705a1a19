use serde::{Deserialize, Serialize};
use validator::Validate;

// ===== REQUEST MODELS =====

#[derive(Debug, Deserialize, Validate)]
pub struct QuestionRequest {
    #[validate(length(min = 1, max = 1000, message = "question must be between 1 and 1000 characters"))]
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct WechatQuery {
    #[serde(default)]
    pub openid: Option<String>,
    #[serde(default)]
    pub echostr: Option<String>,
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub text: String,
}
