use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use qa_core::knowledge::STATIC_TYPE;
use qa_core::{KnowledgeError, KnowledgeStore, LearnedPair, LearnedRecord, StaticPair};

/// Statements table reader/writer.
///
/// Expected columns: `id, question, answer, category, type, parameters, extractor`.
pub struct PgKnowledgeStore {
    pool: PgPool,
    table: String,
}

impl PgKnowledgeStore {
    pub fn new(pool: PgPool, table: &str) -> Result<Self, KnowledgeError> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(KnowledgeError::Validation(format!(
                "invalid statement table name: {:?}",
                table
            )));
        }

        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }
}

fn db_err(e: sqlx::Error) -> KnowledgeError {
    KnowledgeError::Database(e.to_string())
}

#[async_trait]
impl KnowledgeStore for PgKnowledgeStore {
    async fn static_pairs(&self) -> Result<Vec<StaticPair>, KnowledgeError> {
        let rows = sqlx::query_as::<_, (String, String)>(&format!(
            "SELECT question, answer FROM {} WHERE type = $1 ORDER BY id",
            self.table
        ))
        .bind(STATIC_TYPE)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        debug!("Fetched {} static statements from {}", rows.len(), self.table);

        Ok(rows
            .into_iter()
            .map(|(question, answer)| StaticPair { question, answer })
            .collect())
    }

    async fn learn(&self, pair: LearnedPair) -> Result<LearnedRecord, KnowledgeError> {
        let id = sqlx::query_scalar::<_, i64>(&format!(
            r#"INSERT INTO {} (question, answer, category, type, parameters, extractor)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING CAST(id AS BIGINT)"#,
            self.table
        ))
        .bind(&pair.question)
        .bind(&pair.answer)
        .bind(&pair.category)
        .bind(pair.statement_type)
        .bind(&pair.parameters)
        .bind(&pair.extractor)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        info!("Learned statement {} (type={})", id, pair.statement_type);

        Ok(LearnedRecord {
            id,
            question: pair.question,
            answer: pair.answer,
            category: pair.category,
            statement_type: pair.statement_type,
            parameters: pair.parameters,
            extractor: pair.extractor,
        })
    }
}
