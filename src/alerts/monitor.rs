//! Periodic alert evaluation

use super::{AlertBackend, PriceAlert, SharedAlertStore};
use crate::prices::PriceFeed;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Delivers a triggered alert to its owner
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn notify(&self, alert: &PriceAlert, price: f64) -> Result<()>;
}

pub struct AlertMonitor<B> {
    store: SharedAlertStore<B>,
    feed: Arc<dyn PriceFeed>,
    notifier: Arc<dyn AlertNotifier>,
    interval: Duration,
}

impl<B: AlertBackend> AlertMonitor<B> {
    pub fn new(
        store: SharedAlertStore<B>,
        feed: Arc<dyn PriceFeed>,
        notifier: Arc<dyn AlertNotifier>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            feed,
            notifier,
            interval,
        }
    }

    /// Evaluate every alert once; returns how many fired and were removed
    ///
    /// The store lock is released while prices are fetched and while
    /// notifications are sent.
    pub async fn check_once(&self) -> usize {
        let symbols = self.store.lock().await.tracked_symbols();
        let mut fired = 0;

        for symbol in symbols {
            let Some(price) = self.feed.price_usd(&symbol).await else {
                tracing::debug!(symbol = %symbol, "No price, skipping");
                continue;
            };

            let alerts = self.store.lock().await.alerts_for_symbol(&symbol);
            for alert in alerts.iter().filter(|a| a.is_triggered(price)) {
                if let Err(e) = self.notifier.notify(alert, price).await {
                    tracing::warn!(
                        user_id = alert.user_id,
                        symbol = %symbol,
                        error = %e,
                        "Alert delivery failed, keeping it for the next cycle"
                    );
                    continue;
                }

                let mut store = self.store.lock().await;
                match store.remove_if_matches(alert).await {
                    Ok(true) => {
                        fired += 1;
                        tracing::info!(
                            user_id = alert.user_id,
                            symbol = %symbol,
                            price,
                            threshold = alert.threshold,
                            "Price alert triggered"
                        );
                    }
                    Ok(false) => {
                        tracing::debug!(user_id = alert.user_id, symbol = %symbol, "Alert changed while notifying, kept");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to persist alerts");
                    }
                }
            }
        }

        fired
    }

    /// Check every interval until cancelled; the first check waits one interval
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Alert monitor started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let fired = self.check_once().await;
                    if fired > 0 {
                        tracing::info!(fired, "Alert check complete");
                    }
                }
            }
        }

        tracing::info!("Alert monitor stopped");
    }
}
