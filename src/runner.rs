//! Bot runner
//!
//! Wires the alert store, price monitor, and chat bot together and drives
//! them until shutdown.

use crate::alerts::{AlertMonitor, AlertStore, JsonFileBackend};
use crate::bot::{Bot, CommandHandler, TelegramClient, TelegramNotifier};
use crate::config::{Config, Secrets};
use crate::prices::CoinGeckoFeed;
use crate::tokens::registry;
use crate::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Runs RageGuard: the Telegram loop plus the alert monitor
pub struct BotRunner {
    config: Config,
    secrets: Secrets,
}

impl BotRunner {
    pub fn new(config: Config, secrets: Secrets) -> Self {
        Self { config, secrets }
    }

    /// Run until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Shutdown requested");
                    trigger.cancel();
                }
                Err(e) => warn!(error = %e, "Unable to listen for Ctrl-C"),
            }
        });

        self.run_until(cancel).await
    }

    /// Run until `cancel` fires, then save the alerts one last time
    pub async fn run_until(&self, cancel: CancellationToken) -> Result<()> {
        // Fail before touching the network or the alert file
        let token = self.secrets.require_bot_token()?;
        let registry = registry().clone();
        let webapp_url = self.secrets.webapp_url.clone();

        info!(
            store = %self.config.alerts.store_path,
            interval_ms = self.config.alerts.check_interval_ms,
            "Starting RageGuard"
        );

        let store = AlertStore::load(JsonFileBackend::new(&self.config.alerts.store_path))
            .await?
            .into_shared();

        let telegram = Arc::new(TelegramClient::new(&self.config.bot.api_base_url, token));
        let feed = CoinGeckoFeed::new(&self.config.alerts.price_feed_url)
            .with_registry(registry.clone());
        let notifier =
            TelegramNotifier::new(Arc::clone(&telegram), registry.clone(), webapp_url.clone());

        let monitor = AlertMonitor::new(
            Arc::clone(&store),
            Arc::new(feed),
            Arc::new(notifier),
            self.config.alerts.check_interval(),
        );
        let bot = Bot::new(
            telegram,
            CommandHandler::new(Arc::clone(&store), registry, webapp_url),
            self.config.bot.clone(),
        );

        let monitor_task = tokio::spawn({
            let cancel = cancel.clone();
            async move { monitor.run(cancel).await }
        });
        let bot_task = tokio::spawn({
            let cancel = cancel.clone();
            async move { bot.run(cancel).await }
        });

        let (monitor_res, bot_res) = tokio::join!(monitor_task, bot_task);
        for (name, res) in [("alert monitor", monitor_res), ("bot", bot_res)] {
            if let Err(e) = res {
                error!(task = name, error = %e, "Task ended abnormally");
            }
        }

        info!("Saving alerts before shutdown");
        store.lock().await.save().await?;
        Ok(())
    }
}
