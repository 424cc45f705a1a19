//! Durable knowledge store on PostgreSQL

pub mod connection;
mod knowledge_repo;

pub use connection::create_lazy_pool;
pub use knowledge_repo::PgKnowledgeStore;
