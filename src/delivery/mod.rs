//! Delivery channel module.
//!
//! Sends finished stories to individual chats. A failure here is a value the
//! scheduler catches per recipient; it never aborts a tick.

mod telegram;

use async_trait::async_trait;
use thiserror::Error;

pub use telegram::TelegramChannel;

/// Errors sending to a single recipient.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Failed to send to chat {chat_id}: {reason}")]
    SendFailed { chat_id: i64, reason: String },
}

/// Sends one message to one chat.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Delivers `text` to `chat_id`.
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError>;
}
