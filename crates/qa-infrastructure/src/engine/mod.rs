//! Answer engine clients

mod http_engine;

pub use http_engine::HttpAnswerEngine;
