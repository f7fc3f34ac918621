//! Telegram transport: outbound messages, inbound commands, rendering.
//!
//! - [`TelegramNotifier`] talks to the Bot API (sendMessage + getUpdates)
//! - [`NotificationSink`] is the seam the monitor engine alerts through
//! - [`Command`] parses inbound message text
//! - [`format`] renders every user-facing message

mod commands;
pub mod format;
mod telegram;
mod traits;
mod types;

pub use commands::Command;
pub use telegram::TelegramNotifier;
pub use traits::NotificationSink;
pub use types::{Message, Update};

#[cfg(test)]
pub use traits::MockNotificationSink;
