pub mod context_token;

pub use context_token::{ContextTokenManager, CONTEXT_COOKIE};
