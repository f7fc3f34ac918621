//! Outbound notification seam.

use async_trait::async_trait;

use crate::error::MonitorError;

/// Something that can push a text message to a chat.
///
/// The monitor engine only ever talks to this trait; the Telegram client
/// implements it for production and a mock stands in for tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), MonitorError>;
}
