pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod telemetry;
pub mod utils;
pub mod wechat;

pub use router::build_router;
pub use state::AppState;
