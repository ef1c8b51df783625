//! Telegram Bot API notifier

use crate::error::{MonitorError, Result};
use crate::services::notifier::Notifier;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: Client,
    api_url: Url,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        api_url: Url,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| MonitorError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self::with_client(api_url, bot_token, chat_id, client))
    }

    pub fn with_client(
        api_url: Url,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_url,
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// The token is part of the request path, so transport errors carry it.
    fn redact(&self, err: &reqwest::Error) -> String {
        err.to_string().replace(&self.bot_token, "<redacted>")
    }

    fn endpoint(&self) -> Result<Url> {
        self.api_url
            .join(&format!("/bot{}/sendMessage", self.bot_token))
            .map_err(|e| MonitorError::Notification(format!("invalid Telegram URL: {}", e)))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn notify(&self, message: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint()?)
            .json(&json!({ "chat_id": self.chat_id, "text": message }))
            .send()
            .await
            .map_err(|e| MonitorError::Notification(format!("request failed: {}", self.redact(&e))))?;

        let status = response.status();
        let body: Option<SendMessageResponse> = response.json().await.ok();

        match body {
            Some(SendMessageResponse { ok: true, .. }) if status.is_success() => {
                debug!(chat_id = %self.chat_id, "Telegram: message sent");
                Ok(())
            }
            Some(SendMessageResponse { description, .. }) => Err(MonitorError::Notification(
                format!(
                    "HTTP {}: {}",
                    status,
                    description.unwrap_or_else(|| "rejected".to_string())
                ),
            )),
            None => Err(MonitorError::Notification(format!("HTTP {}", status))),
        }
    }
}
