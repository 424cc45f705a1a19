#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

use qa_api_server::auth::ContextTokenManager;
use qa_api_server::{build_router, AppState};
use qa_core::{
    AnswerEngine, ConversationContext, EngineAnswer, EngineError, KnowledgeError, KnowledgeStore,
    KvStore, LearnedPair, LearnedRecord, MemoryStore, StaticPair, StoreError,
};

pub const TOKEN_SECRET: &str = "integration-secret";

/// Answer engine double: replays scripted answers, otherwise echoes.
#[derive(Default)]
pub struct StubEngine {
    calls: AtomicUsize,
    delay: Option<Duration>,
    replies: Mutex<VecDeque<Result<EngineAnswer, EngineError>>>,
    contexts: Mutex<Vec<Option<ConversationContext>>>,
}

impl StubEngine {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push_reply(&self, reply: Result<EngineAnswer, EngineError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Context forwarded on each call, in call order.
    pub fn contexts(&self) -> Vec<Option<ConversationContext>> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerEngine for StubEngine {
    async fn get_response(
        &self,
        question: &str,
        context: Option<ConversationContext>,
    ) -> Result<EngineAnswer, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().unwrap().push(context);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(EngineAnswer::text(format!("engine: {}", question))))
    }
}

#[derive(Default)]
pub struct StubKnowledge {
    static_pairs: Vec<StaticPair>,
    learned: Mutex<Vec<LearnedRecord>>,
}

impl StubKnowledge {
    pub fn with_static(pairs: &[(&str, &str)]) -> Self {
        Self {
            static_pairs: pairs.iter().map(|(q, a)| StaticPair::new(*q, *a)).collect(),
            learned: Mutex::new(Vec::new()),
        }
    }

    pub fn learned(&self) -> Vec<LearnedRecord> {
        self.learned.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeStore for StubKnowledge {
    async fn static_pairs(&self) -> Result<Vec<StaticPair>, KnowledgeError> {
        Ok(self.static_pairs.clone())
    }

    async fn learn(&self, pair: LearnedPair) -> Result<LearnedRecord, KnowledgeError> {
        let mut learned = self.learned.lock().unwrap();
        let record = LearnedRecord {
            id: learned.len() as i64 + 1,
            question: pair.question,
            answer: pair.answer,
            category: pair.category,
            statement_type: pair.statement_type,
            parameters: pair.parameters,
            extractor: pair.extractor,
        };
        learned.push(record.clone());
        Ok(record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outage {
    /// Every operation fails.
    Total,
    /// Only string reads fail, which is how context lookups reach the store.
    ContextReads,
}

/// `MemoryStore` that fails the operations covered by its `Outage`.
pub struct FailingStore {
    pub inner: MemoryStore,
    outage: Outage,
}

impl FailingStore {
    pub fn new(outage: Outage) -> Self {
        Self {
            inner: MemoryStore::new(),
            outage,
        }
    }

    fn check(&self, affected: bool) -> Result<(), StoreError> {
        if self.outage == Outage::Total || affected {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KvStore for FailingStore {
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        self.check(false)?;
        self.inner.hget(key, field).await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.check(false)?;
        self.inner.hset(key, field, value).await
    }

    async fn hset_nx(&self, key: &str, field: &str, value: &str) -> Result<bool, StoreError> {
        self.check(false)?;
        self.inner.hset_nx(key, field, value).await
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool, StoreError> {
        self.check(false)?;
        self.inner.hexists(key, field).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check(self.outage == Outage::ContextReads)?;
        self.inner.get(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.check(false)?;
        self.inner.set_ex(key, value, ttl).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check(false)?;
        self.inner.ping().await
    }
}

/// Router over an arbitrary store, with no static pairs loaded.
pub fn router_over(store: Arc<dyn KvStore>, engine: Arc<StubEngine>) -> Router {
    let tokens = ContextTokenManager::new(TOKEN_SECRET, Duration::from_secs(120));
    let state = AppState::new(store, engine, Arc::new(StubKnowledge::default()), tokens);
    build_router(state)
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub engine: Arc<StubEngine>,
    pub knowledge: Arc<StubKnowledge>,
}

impl TestApp {
    /// App over an in-memory store with the static pairs already loaded.
    pub async fn spawn(engine: StubEngine, static_pairs: &[(&str, &str)]) -> Self {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(engine);
        let knowledge = Arc::new(StubKnowledge::with_static(static_pairs));
        let tokens = ContextTokenManager::new(TOKEN_SECRET, Duration::from_secs(120));

        let state = AppState::new(store.clone(), engine.clone(), knowledge.clone(), tokens);
        state
            .static_cache
            .load_from(knowledge.as_ref())
            .await
            .expect("static pairs load");

        Self {
            router: build_router(state),
            store,
            engine,
            knowledge,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn json_request(uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn xml_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "text/xml")
        .body(Body::from(body))
        .unwrap()
}

pub fn text_message(from: &str, msg_id: &str, content: &str) -> String {
    format!(
        "<xml>\
         <ToUserName><![CDATA[gh_account]]></ToUserName>\
         <FromUserName><![CDATA[{}]]></FromUserName>\
         <CreateTime>1700000000</CreateTime>\
         <MsgType><![CDATA[text]]></MsgType>\
         <Content><![CDATA[{}]]></Content>\
         <MsgId>{}</MsgId>\
         </xml>",
        from, content, msg_id
    )
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
