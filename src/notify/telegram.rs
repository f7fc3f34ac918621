//! Telegram Bot API client.
//!
//! Covers the two methods the service needs: `sendMessage` for outbound
//! alerts and long-polled `getUpdates` for inbound commands. The bot token
//! is part of every request URL, so transport errors are scrubbed with
//! [`reqwest::Error::without_url`] before wrapping, and the `Debug` impl
//! redacts the token.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::TelegramConfig;
use crate::error::MonitorError;
use crate::notify::traits::NotificationSink;
use crate::notify::types::{ApiResponse, GetUpdatesRequest, Message, SendMessageRequest, Update};

const PARSE_MODE_MARKDOWN: &str = "Markdown";

#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    base_url: String,
    token: String,
    poll_timeout_secs: u64,
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

impl TelegramNotifier {
    /// Build a client against the configured API host. The token is passed
    /// separately because it resolves from the environment first.
    pub fn new(config: &TelegramConfig, token: &str) -> Result<Self> {
        Self::with_base_url(&config.api_url, token, config.poll_timeout_secs)
    }

    pub fn with_base_url(base_url: &str, token: &str, poll_timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            // getUpdates holds the connection open for the long-poll window.
            .timeout(Duration::from_secs(poll_timeout_secs + 10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            poll_timeout_secs,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Strip the token-bearing URL out of a transport error before it can
    /// reach a log line or an error chain.
    fn redact(err: reqwest::Error) -> anyhow::Error {
        anyhow::Error::new(err.without_url())
    }

    #[instrument(skip(self, text), name = "telegram_send_message")]
    async fn call_send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: PARSE_MODE_MARKDOWN,
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await
            .map_err(Self::redact)
            .context("Failed to send sendMessage request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram API error {}: {}", status, body);
        }

        let api_response: ApiResponse<Message> = response
            .json()
            .await
            .map_err(Self::redact)
            .context("Failed to parse sendMessage response")?;
        if !api_response.ok {
            anyhow::bail!(
                "Telegram rejected sendMessage: {}",
                api_response.description.unwrap_or_default()
            );
        }

        debug!(chat_id, "Message delivered");
        Ok(())
    }

    /// Long-poll for inbound updates starting at `offset`.
    #[instrument(skip(self), name = "telegram_get_updates")]
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout_secs,
        };

        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .json(&request)
            .send()
            .await
            .map_err(Self::redact)
            .context("Failed to send getUpdates request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram API error {}: {}", status, body);
        }

        let api_response: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .map_err(Self::redact)
            .context("Failed to parse getUpdates response")?;
        if !api_response.ok {
            anyhow::bail!(
                "Telegram rejected getUpdates: {}",
                api_response.description.unwrap_or_default()
            );
        }

        Ok(api_response.result.unwrap_or_default())
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), MonitorError> {
        self.call_send_message(chat_id, text)
            .await
            .map_err(MonitorError::DeliveryFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_message_posts_to_bot_endpoint() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/botTEST_TOKEN/sendMessage"))
            .and(body_partial_json(serde_json::json!({
                "chat_id": 42,
                "text": "ping",
                "parse_mode": "Markdown"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"message_id": 1, "chat": {"id": 42}, "text": "ping"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let notifier =
            TelegramNotifier::with_base_url(&mock_server.uri(), "TEST_TOKEN", 1).unwrap();
        notifier.send_message(42, "ping").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_send_is_delivery_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/botTEST_TOKEN/sendMessage"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            })))
            .mount(&mock_server)
            .await;

        let notifier =
            TelegramNotifier::with_base_url(&mock_server.uri(), "TEST_TOKEN", 1).unwrap();
        let err = notifier.send_message(42, "ping").await.unwrap_err();

        assert!(matches!(err, MonitorError::DeliveryFailure(_)));
    }

    #[tokio::test]
    async fn test_get_updates_parses_messages() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/botTEST_TOKEN/getUpdates"))
            .and(body_partial_json(serde_json::json!({"offset": 7})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [{
                    "update_id": 7,
                    "message": {
                        "message_id": 3,
                        "chat": {"id": 42, "type": "private"},
                        "text": "/status"
                    }
                }]
            })))
            .mount(&mock_server)
            .await;

        let notifier =
            TelegramNotifier::with_base_url(&mock_server.uri(), "TEST_TOKEN", 1).unwrap();
        let updates = notifier.get_updates(7).await.unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].update_id, 7);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("/status"));
    }

    #[test]
    fn test_debug_output_redacts_token() {
        let notifier =
            TelegramNotifier::with_base_url("https://api.telegram.org", "SECRET_TOKEN", 30)
                .unwrap();

        let debug = format!("{:?}", notifier);
        assert!(!debug.contains("SECRET_TOKEN"));
        assert!(debug.contains("<redacted>"));
    }
}
