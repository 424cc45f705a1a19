use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    let chatbot_routes = Router::new()
        .route("/question", post(handlers::question::question_handler))
        .route("/learn", post(handlers::learn::learn_handler))
        .route(
            "/wechat",
            get(handlers::wechat::verify_handler).post(handlers::wechat::message_handler),
        );

    Router::new()
        .merge(public_routes)
        .nest("/api/chatbot", chatbot_routes)
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
