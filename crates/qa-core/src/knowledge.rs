//! Durable knowledge store port and its record types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::KnowledgeError;

/// Statement type of pre-computed single-turn pairs.
pub const STATIC_TYPE: i32 = 0;

/// Statement type of pairs learned through conversation.
pub const LEARNED_TYPE: i32 = 1;

/// A pre-computed question/answer pair eligible for the static cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPair {
    pub question: String,
    pub answer: String,
}

impl StaticPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

fn default_category() -> String {
    "其他".to_string()
}

fn validate_statement_type(value: i32) -> Result<(), ValidationError> {
    if value == STATIC_TYPE || value == LEARNED_TYPE {
        Ok(())
    } else {
        let mut err = ValidationError::new("statement_type");
        err.message = Some("the type must be 0 or 1".into());
        Err(err)
    }
}

/// A new pair submitted through the learn endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LearnedPair {
    #[validate(length(min = 1, max = 1000, message = "question must be between 1 and 1000 characters"))]
    pub question: String,

    #[validate(length(min = 1, max = 1000, message = "answer must be between 1 and 1000 characters"))]
    pub answer: String,

    #[serde(default = "default_category")]
    #[validate(length(max = 100, message = "category too long"))]
    pub category: String,

    #[serde(rename = "type", default)]
    #[validate(custom(function = "validate_statement_type"))]
    pub statement_type: i32,

    #[serde(default)]
    #[validate(length(max = 255, message = "parameters too long"))]
    pub parameters: Option<String>,

    #[serde(default)]
    #[validate(length(max = 255, message = "extractor too long"))]
    pub extractor: Option<String>,
}

/// A stored statement as returned after a learn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: String,
    #[serde(rename = "type")]
    pub statement_type: i32,
    pub parameters: Option<String>,
    pub extractor: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Every stored pair of the static type.
    async fn static_pairs(&self) -> Result<Vec<StaticPair>, KnowledgeError>;

    /// Write-through insert of a new pair.
    async fn learn(&self, pair: LearnedPair) -> Result<LearnedRecord, KnowledgeError>;
}
