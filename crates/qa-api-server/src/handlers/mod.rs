pub mod health;
pub mod learn;
pub mod question;
pub mod wechat;
