//! Telegram Bot API delivery channel.

use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::debug;

use super::{DeliveryChannel, DeliveryError};

/// Delivery channel backed by the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramChannel {
    bot: Bot,
}

impl TelegramChannel {
    /// Wraps an existing bot client.
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl DeliveryChannel for TelegramChannel {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        debug!("Sending {} chars to chat {}", text.chars().count(), chat_id);

        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::SendFailed {
                chat_id,
                reason: e.to_string(),
            })
    }
}
