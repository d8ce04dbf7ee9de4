//! Outbound notifications through the Telegram bot API.
use async_trait::async_trait;
use std::fmt;
use teloxide::prelude::*;
use teloxide::types::Recipient;
use tracing::{debug, error, instrument};

use crate::error::{BotError, Result};

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl fmt::Debug for TelegramMessenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramMessenger").finish_non_exhaustive()
    }
}

impl TelegramMessenger {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }
}

/// Numeric ids address a chat directly; anything else is a `@channel` username.
pub fn recipient(chat_id: &str) -> Recipient {
    let trimmed = chat_id.trim();
    match trimmed.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(trimmed.to_string()),
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        self.bot
            .send_message(recipient(chat_id), text)
            .await
            .map(|_| ())
            .map_err(|err| BotError::NotificationDeliveryFailed(err.to_string()))
    }
}

/// Best-effort delivery: failures are logged and swallowed.
#[instrument(skip_all)]
pub async fn send_message(messenger: &dyn Messenger, chat_id: &str, text: &str) -> bool {
    match messenger.send(chat_id, text).await {
        Ok(()) => {
            debug!("notification sent");
            true
        }
        Err(err) => {
            error!(?err, "notification was not delivered");
            false
        }
    }
}
