//! Static answer cache
//!
//! Read path over the `static_qa` hash plus the one-shot bulk loader that
//! fills it from the durable knowledge store at startup.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::LoadError;
use crate::knowledge::KnowledgeStore;
use crate::store::{KvStore, STATIC_QA_KEY};

/// Outcome of one bulk load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    /// Pairs written because the question was new.
    pub inserted: usize,
    /// Pairs skipped because the question already had an answer.
    pub skipped: usize,
}

#[derive(Clone)]
pub struct StaticAnswerCache {
    store: Arc<dyn KvStore>,
}

impl StaticAnswerCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Look up a pre-computed answer.
    ///
    /// Store failures degrade to a miss so the question falls through to the
    /// answer engine.
    pub async fn lookup(&self, question: &str) -> Option<String> {
        match self.store.hget(STATIC_QA_KEY, question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Static cache lookup failed, treating as miss: {}", e);
                None
            }
        }
    }

    /// Copy every static pair into the cache, first write wins.
    ///
    /// Safe to run repeatedly and concurrently with lookups: each insert is a
    /// conditional set, so existing answers are never replaced.
    pub async fn load_from(&self, source: &dyn KnowledgeStore) -> Result<LoadReport, LoadError> {
        info!("Start loading static qa pairs to the cache");

        let pairs = source.static_pairs().await?;
        let mut report = LoadReport::default();

        for pair in pairs {
            if self
                .store
                .hset_nx(STATIC_QA_KEY, &pair.question, &pair.answer)
                .await?
            {
                report.inserted += 1;
            } else {
                debug!("Static answer for {:?} already cached, skipping", pair.question);
                report.skipped += 1;
            }
        }

        info!(
            "Loading static qa pairs complete: inserted={}, skipped={}",
            report.inserted, report.skipped
        );
        Ok(report)
    }

    /// Run `load_from` on a detached task. Failures are logged, never raised.
    pub fn spawn_load(&self, source: Arc<dyn KnowledgeStore>) -> JoinHandle<Option<LoadReport>> {
        let cache = self.clone();
        tokio::spawn(async move {
            match cache.load_from(source.as_ref()).await {
                Ok(report) => Some(report),
                Err(e) => {
                    error!("Static qa load failed: {}", e);
                    None
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KnowledgeError;
    use crate::knowledge::{MockKnowledgeStore, StaticPair};
    use crate::store::testing::DownStore;
    use crate::store::MemoryStore;

    fn source_with(pairs: Vec<StaticPair>) -> MockKnowledgeStore {
        let mut source = MockKnowledgeStore::new();
        source
            .expect_static_pairs()
            .returning(move || Ok(pairs.clone()));
        source
    }

    #[tokio::test]
    async fn test_lookup_hit_and_miss() {
        let store = Arc::new(MemoryStore::new());
        store.hset(STATIC_QA_KEY, "营业时间", "9:00-18:00").await.unwrap();
        let cache = StaticAnswerCache::new(store);

        assert_eq!(cache.lookup("营业时间").await.as_deref(), Some("9:00-18:00"));
        assert_eq!(cache.lookup("unknown").await, None);
    }

    #[tokio::test]
    async fn test_lookup_store_failure_is_miss() {
        let cache = StaticAnswerCache::new(Arc::new(DownStore));
        assert_eq!(cache.lookup("anything").await, None);
    }

    #[tokio::test]
    async fn test_load_is_first_write_wins() {
        let store = Arc::new(MemoryStore::new());
        store.hset(STATIC_QA_KEY, "q1", "existing").await.unwrap();
        let cache = StaticAnswerCache::new(store.clone());

        let source = source_with(vec![
            StaticPair::new("q1", "new"),
            StaticPair::new("q2", "a2"),
            StaticPair::new("q2", "a2-duplicate"),
        ]);

        let report = cache.load_from(&source).await.unwrap();
        assert_eq!(report, LoadReport { inserted: 1, skipped: 2 });
        assert_eq!(cache.lookup("q1").await.as_deref(), Some("existing"));
        assert_eq!(cache.lookup("q2").await.as_deref(), Some("a2"));
    }

    #[tokio::test]
    async fn test_load_twice_yields_same_contents() {
        let pairs = vec![StaticPair::new("q1", "a1"), StaticPair::new("q2", "a2")];

        let once = Arc::new(MemoryStore::new());
        StaticAnswerCache::new(once.clone())
            .load_from(&source_with(pairs.clone()))
            .await
            .unwrap();

        let twice = Arc::new(MemoryStore::new());
        let cache = StaticAnswerCache::new(twice.clone());
        let source = source_with(pairs);
        cache.load_from(&source).await.unwrap();
        let second = cache.load_from(&source).await.unwrap();

        assert_eq!(second, LoadReport { inserted: 0, skipped: 2 });
        assert_eq!(
            once.hgetall(STATIC_QA_KEY).unwrap(),
            twice.hgetall(STATIC_QA_KEY).unwrap()
        );
    }

    #[tokio::test]
    async fn test_load_source_failure() {
        let mut source = MockKnowledgeStore::new();
        source
            .expect_static_pairs()
            .returning(|| Err(KnowledgeError::Database("relation does not exist".into())));

        let cache = StaticAnswerCache::new(Arc::new(MemoryStore::new()));
        let err = cache.load_from(&source).await.unwrap_err();
        assert!(matches!(err, LoadError::Source(_)));
    }

    #[tokio::test]
    async fn test_spawn_load_swallows_failure() {
        let cache = StaticAnswerCache::new(Arc::new(DownStore));
        let source = Arc::new(source_with(vec![StaticPair::new("q", "a")]));

        let outcome = cache.spawn_load(source).await.unwrap();
        assert_eq!(outcome, None);
    }
}
