//! # QA Infrastructure
//!
//! Implementations of the core ports against Redis, PostgreSQL and the
//! HTTP answer engine.

pub mod cache;
pub mod database;
pub mod engine;

pub use cache::RedisStore;
pub use database::PgKnowledgeStore;
pub use engine::HttpAnswerEngine;
