use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WechatError {
    #[error("Malformed message envelope: {0}")]
    Malformed(String),
}

/// Inbound push from the official-account platform.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename = "xml")]
pub struct InboundMessage {
    /// Official account id
    #[serde(rename = "ToUserName")]
    pub to_user: String,

    /// Sender openid
    #[serde(rename = "FromUserName")]
    pub from_user: String,

    #[serde(rename = "CreateTime", default)]
    pub create_time: i64,

    #[serde(rename = "MsgType")]
    pub msg_type: String,

    #[serde(rename = "Content", default)]
    pub content: Option<String>,

    #[serde(rename = "MsgId", default)]
    pub msg_id: Option<String>,
}

impl InboundMessage {
    pub fn parse(body: &str) -> Result<Self, WechatError> {
        quick_xml::de::from_str(body).map_err(|e| WechatError::Malformed(e.to_string()))
    }

    /// Question text of a text message; `None` for every other type.
    pub fn text(&self) -> Option<&str> {
        if self.msg_type == "text" {
            Some(self.content.as_deref().unwrap_or(""))
        } else {
            None
        }
    }

    /// Id used to recognise redeliveries of the same push.
    pub fn delivery_id(&self) -> String {
        match &self.msg_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => format!("{}{}", self.from_user, self.create_time),
        }
    }
}
