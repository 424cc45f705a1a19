use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use qa_api_server::auth::ContextTokenManager;
use qa_api_server::config::{Settings, StoreBackend};
use qa_api_server::telemetry::init_telemetry;
use qa_api_server::{build_router, AppState};
use qa_core::{KnowledgeStore, KvStore, MemoryStore};
use qa_infrastructure::database::create_lazy_pool;
use qa_infrastructure::{HttpAnswerEngine, PgKnowledgeStore, RedisStore};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    let _log_guard = init_telemetry(&settings.logging)?;

    info!("🚀 Starting QA API Server...");

    let store: Arc<dyn KvStore> = match settings.store.backend {
        StoreBackend::Redis => {
            let store = RedisStore::new(&settings.store.redis_url, settings.store.pool_max_size)?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            warn!("Using in-process memory store; state is lost on restart and not shared");
            Arc::new(MemoryStore::new())
        }
    };

    // Lazy so the server still starts when the database is down; the loader logs the failure.
    let pool = create_lazy_pool(
        &settings.database.url,
        settings.database.pool_max_size,
        std::time::Duration::from_secs(settings.database.pool_timeout_seconds),
    )?;
    let knowledge: Arc<dyn KnowledgeStore> =
        Arc::new(PgKnowledgeStore::new(pool, &settings.database.statement_table)?);

    let engine = Arc::new(HttpAnswerEngine::new(
        &settings.engine.base_url,
        settings.engine.timeout(),
    )?);
    info!("✅ Answer engine client for {}", settings.engine.base_url);

    let tokens = ContextTokenManager::new(&settings.context.token_secret, settings.context.ttl());
    let state = AppState::new(store, engine, knowledge.clone(), tokens);

    if settings.loader.enabled {
        state.static_cache.spawn_load(knowledge);
    } else {
        info!("Static cache loader disabled");
    }

    let app = build_router(state);

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));
    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
