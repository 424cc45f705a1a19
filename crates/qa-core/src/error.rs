//! Core error types

use thiserror::Error;

/// Failures of the shared key-value store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store command failed: {0}")]
    Command(String),

    #[error("Wrong value type at key {0}")]
    WrongType(String),
}

/// Failures raised by the answer engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{0}")]
    Request(String),

    #[error("{0}")]
    InvalidResponse(String),
}

/// Failures of the durable knowledge store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Failures of the static-pair bulk load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Failed to read static pairs: {0}")]
    Source(#[from] KnowledgeError),

    #[error("Failed to write static pairs: {0}")]
    Store(#[from] StoreError),
}
