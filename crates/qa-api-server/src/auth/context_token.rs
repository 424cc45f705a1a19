//! Client-held conversation context for the JSON channel
//!
//! The context travels in a signed JWT stored in the `context` cookie. The
//! token's `exp` fixes its lifetime; it is re-issued only when a turn yields
//! a new context.

use axum::http::header::{InvalidHeaderValue, COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::Error as JwtError, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use qa_core::ConversationContext;

pub const CONTEXT_COOKIE: &str = "context";

#[derive(Debug, Serialize, Deserialize)]
struct ContextClaims {
    exp: i64,
    ctx: ConversationContext,
}

pub struct ContextTokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl ContextTokenManager {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn generate_token(&self, context: &ConversationContext) -> Result<String, JwtError> {
        let claims = ContextClaims {
            exp: expires_at(Utc::now().timestamp(), self.ttl),
            ctx: context.clone(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate_token(&self, token: &str) -> Result<ConversationContext, JwtError> {
        decode::<ContextClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.ctx)
    }

    /// Context carried by the request, if any. Bad tokens read as absent.
    pub fn context_from_headers(&self, headers: &HeaderMap) -> Option<ConversationContext> {
        let token = cookie_value(headers, CONTEXT_COOKIE)?;
        match self.validate_token(&token) {
            Ok(context) => Some(context),
            Err(e) => {
                debug!("Ignoring context cookie: {}", e);
                None
            }
        }
    }

    /// `Set-Cookie` value carrying a freshly issued token.
    pub fn set_cookie(&self, context: &ConversationContext) -> Result<HeaderValue, CookieError> {
        let token = self.generate_token(context)?;
        let cookie = format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            CONTEXT_COOKIE,
            token,
            self.ttl.as_secs()
        );
        Ok(HeaderValue::from_str(&cookie)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("Token creation failed: {0}")]
    Token(#[from] JwtError),

    #[error("Invalid cookie header: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// Unix expiry `ttl` after `now`, saturating instead of wrapping.
fn expires_at(now: i64, ttl: Duration) -> i64 {
    let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    now.saturating_add(ttl)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}
