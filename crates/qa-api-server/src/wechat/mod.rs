//! WeChat official-account envelope codec

mod message;
mod reply;

pub use message::{InboundMessage, WechatError};
pub use reply::TextReply;
