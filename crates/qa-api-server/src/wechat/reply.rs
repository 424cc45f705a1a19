use chrono::Utc;

use super::InboundMessage;

/// Passive text reply addressed back to the sender of `inbound`.
pub struct TextReply<'a> {
    to_user: &'a str,
    from_user: &'a str,
    content: &'a str,
    create_time: i64,
}

impl<'a> TextReply<'a> {
    pub fn new(content: &'a str, inbound: &'a InboundMessage) -> Self {
        Self {
            to_user: &inbound.from_user,
            from_user: &inbound.to_user,
            content,
            create_time: Utc::now().timestamp(),
        }
    }

    pub fn at(mut self, create_time: i64) -> Self {
        self.create_time = create_time;
        self
    }

    pub fn render(&self) -> String {
        format!(
            "<xml>\n\
             <ToUserName>{}</ToUserName>\n\
             <FromUserName>{}</FromUserName>\n\
             <CreateTime>{}</CreateTime>\n\
             <MsgType><![CDATA[text]]></MsgType>\n\
             <Content>{}</Content>\n\
             </xml>",
            cdata(self.to_user),
            cdata(self.from_user),
            self.create_time,
            cdata(self.content),
        )
    }
}

fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}
