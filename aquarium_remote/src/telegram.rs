//! Minimal Telegram Bot API client over long polling.

use crate::error::{RemoteError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl InlineKeyboardButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
            url: None,
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: None,
            url: Some(url.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

fn unwrap_envelope<T>(env: Envelope<T>) -> Result<T> {
    match (env.ok, env.result) {
        (true, Some(v)) => Ok(v),
        (true, None) => Err(RemoteError::Decode("missing result".into())),
        (false, _) => Err(RemoteError::Api(
            env.description.unwrap_or_else(|| "unknown error".into()),
        )),
    }
}

pub fn method_url(api_base: &str, token: &str, method: &str) -> String {
    format!("{}/bot{}/{}", api_base.trim_end_matches('/'), token, method)
}

pub struct TelegramClient {
    api_base: String,
    token: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// `poll_timeout` is the long-poll window; the socket timeout is set a bit above it.
    pub fn new(api_base: impl Into<String>, token: impl Into<String>, poll_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build();
        Self {
            api_base: api_base.into(),
            token: token.into(),
            agent,
        }
    }

    fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T> {
        let url = method_url(&self.api_base, &self.token, method);
        // Bot API reports failures as 4xx with a JSON envelope.
        let resp = match self.agent.post(&url).send_json(body) {
            Ok(r) => r,
            Err(ureq::Error::Status(_, r)) => r,
            Err(e) => return Err(e.into()),
        };
        let env: Envelope<T> = resp
            .into_json()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        unwrap_envelope(env)
    }

    pub fn get_updates(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<Update>> {
        let mut body = json!({
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(off) = offset {
            body["offset"] = json!(off);
        }
        self.call("getUpdates", &body)
    }

    pub fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(m) = markup {
            body["reply_markup"] = json!(m);
        }
        self.call::<Value>("sendMessage", &body).map(drop)
    }

    pub fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut body = json!({ "chat_id": chat_id, "message_id": message_id, "text": text });
        if let Some(m) = markup {
            body["reply_markup"] = json!(m);
        }
        match self.call::<Value>("editMessageText", &body) {
            Ok(_) => Ok(()),
            // Re-rendering an unchanged status is not an error for us.
            Err(RemoteError::Api(d)) if d.contains("message is not modified") => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        self.call::<Value>("answerCallbackQuery", &json!({ "callback_query_id": callback_id }))
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_shape() {
        assert_eq!(
            method_url("https://api.telegram.org/", "123:abc", "getUpdates"),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn parses_message_and_callback_updates() {
        let raw = r#"{"ok":true,"result":[
            {"update_id":10,"message":{"message_id":1,"chat":{"id":42},"text":"/start"}},
            {"update_id":11,"callback_query":{"id":"cb1","data":"light",
                "message":{"message_id":2,"chat":{"id":42}}}}
        ]}"#;
        let env: Envelope<Vec<Update>> = serde_json::from_str(raw).unwrap();
        let updates = unwrap_envelope(env).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].message.as_ref().unwrap().text.as_deref(), Some("/start"));
        let cb = updates[1].callback_query.as_ref().unwrap();
        assert_eq!(cb.data.as_deref(), Some("light"));
        assert_eq!(cb.message.as_ref().unwrap().chat.id, 42);
    }

    #[test]
    fn api_error_surfaces_description() {
        let env: Envelope<Value> =
            serde_json::from_str(r#"{"ok":false,"description":"Unauthorized"}"#).unwrap();
        match unwrap_envelope(env) {
            Err(RemoteError::Api(d)) => assert_eq!(d, "Unauthorized"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn keyboard_serializes_like_bot_api() {
        let kb = InlineKeyboardMarkup {
            inline_keyboard: vec![vec![
                InlineKeyboardButton::callback("Status", "status"),
                InlineKeyboardButton::link("Site", "https://example.org"),
            ]],
        };
        let v = serde_json::to_value(&kb).unwrap();
        assert_eq!(v["inline_keyboard"][0][0]["callback_data"], "status");
        assert!(v["inline_keyboard"][0][0].get("url").is_none());
        assert_eq!(v["inline_keyboard"][0][1]["url"], "https://example.org");
    }
}
