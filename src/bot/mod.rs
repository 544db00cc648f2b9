//! RageGuard chat bot
//!
//! Long-polls Telegram for messages, answers commands, and delivers
//! triggered price alerts.

mod commands;
pub mod messages;
mod telegram;

pub use commands::{Command, CommandHandler, Reply};
pub use telegram::{InlineButton, TelegramClient, Update};

use crate::alerts::{AlertBackend, AlertNotifier, PriceAlert};
use crate::config::BotConfig;
use crate::tokens::TokenRegistry;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

pub struct Bot<B> {
    telegram: Arc<TelegramClient>,
    handler: CommandHandler<B>,
    config: BotConfig,
}

impl<B: AlertBackend> Bot<B> {
    pub fn new(telegram: Arc<TelegramClient>, handler: CommandHandler<B>, config: BotConfig) -> Self {
        Self {
            telegram,
            handler,
            config,
        }
    }

    /// Poll and answer until cancelled
    pub async fn run(&self, cancel: CancellationToken) {
        let mut offset: Option<i64> = None;
        let backoff = Duration::from_millis(self.config.error_backoff_ms);
        tracing::info!("RageGuard is running");

        loop {
            let updates = tokio::select! {
                _ = cancel.cancelled() => break,
                res = self.telegram.get_updates(offset, self.config.long_poll_timeout_secs) => res,
            };

            match updates {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.process(update).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to fetch updates, backing off");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }

        tracing::info!("RageGuard stopped");
    }

    async fn process(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let user_id = message.from.as_ref().map(|u| u.id);
        tracing::debug!(
            update_id = update.update_id,
            chat_id = message.chat.id,
            user_id,
            text,
            "Received message"
        );

        for reply in self.handler.handle(user_id, text).await {
            if let Err(e) = self
                .telegram
                .send_message(
                    message.chat.id,
                    &reply.text,
                    reply.markdown,
                    reply.button.as_ref(),
                )
                .await
            {
                tracing::warn!(chat_id = message.chat.id, error = %e, "Failed to send reply");
            }
        }
    }
}

/// Delivers triggered alerts as Telegram direct messages
pub struct TelegramNotifier {
    telegram: Arc<TelegramClient>,
    registry: TokenRegistry,
    webapp_url: Url,
}

impl TelegramNotifier {
    pub fn new(telegram: Arc<TelegramClient>, registry: TokenRegistry, webapp_url: Url) -> Self {
        Self {
            telegram,
            registry,
            webapp_url,
        }
    }
}

#[async_trait]
impl AlertNotifier for TelegramNotifier {
    async fn notify(&self, alert: &PriceAlert, price: f64) -> Result<()> {
        let text = messages::alert_triggered(alert, price, &self.registry.chain_name(alert.chain_id));
        let button = InlineButton {
            text: messages::RAGEQUIT_BUTTON.to_string(),
            url: self.webapp_url.to_string(),
        };
        // Private chat id equals the user id
        self.telegram
            .send_message(alert.user_id, &text, true, Some(&button))
            .await
    }
}
