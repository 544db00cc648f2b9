//! Minimal Telegram Bot API client

use crate::{Error, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// A single URL button under a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramClient {
    client: Client,
    api_base_url: String,
    token: SecretString,
}

impl TelegramClient {
    pub fn new(api_base_url: &str, token: &SecretString) -> Self {
        Self {
            client: Client::new(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            token: SecretString::from(token.expose_secret().to_owned()),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base_url,
            self.token.expose_secret(),
            method
        )
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: Value,
        timeout: Duration,
    ) -> Result<T> {
        let response: ApiResponse<T> = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            // reqwest errors carry the URL, which carries the token
            .map_err(|e| Error::Telegram(format!("{} request failed: {}", method, e.without_url())))?
            .json()
            .await
            .map_err(|e| Error::Telegram(format!("{} response unreadable: {}", method, e.without_url())))?;

        if !response.ok {
            return Err(Error::Telegram(format!(
                "{}: {}",
                method,
                response.description.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        response
            .result
            .ok_or_else(|| Error::Telegram(format!("{}: empty result", method)))
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call(
            "getUpdates",
            body,
            Duration::from_secs(timeout_secs + 10),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
        button: Option<&InlineButton>,
    ) -> Result<()> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });
        if markdown {
            body["parse_mode"] = json!("Markdown");
        }
        if let Some(button) = button {
            body["reply_markup"] = json!({ "inline_keyboard": [[button]] });
        }

        let _: Value = self
            .call("sendMessage", body, Duration::from_secs(30))
            .await?;
        tracing::debug!(chat_id, "Telegram message sent");
        Ok(())
    }
}
