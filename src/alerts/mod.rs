//! Price alerts
//!
//! Alerts live in memory in an [`AlertStore`] keyed by (user, symbol). Every
//! mutation is followed by a full rewrite through the [`AlertBackend`], which
//! only serves as a checkpoint for the next start.

mod backend;
mod monitor;

pub use backend::{AlertBackend, JsonFileBackend, MemoryBackend};
pub use monitor::{AlertMonitor, AlertNotifier};

use crate::Result;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_ascii_lowercase().as_str() {
            "above" => Some(Self::Above),
            "below" => Some(Self::Below),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Above => "📈",
            Self::Below => "📉",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlert {
    pub user_id: i64,
    pub token_symbol: String,
    pub threshold: f64,
    pub direction: Direction,
    pub chain_id: u64,
    pub token_address: Address,
}

impl PriceAlert {
    pub fn key(&self) -> AlertKey {
        AlertKey::new(self.user_id, &self.token_symbol)
    }

    /// Whether `price` crosses the threshold (inclusive)
    pub fn is_triggered(&self, price: f64) -> bool {
        match self.direction {
            Direction::Above => price >= self.threshold,
            Direction::Below => price <= self.threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub user_id: i64,
    pub symbol_upper: String,
}

impl AlertKey {
    pub fn new(user_id: i64, symbol: &str) -> Self {
        Self {
            user_id,
            symbol_upper: symbol.to_uppercase(),
        }
    }
}

/// In-memory alert set with write-through persistence
pub struct AlertStore<B> {
    alerts: HashMap<AlertKey, PriceAlert>,
    backend: B,
}

pub type SharedAlertStore<B> = Arc<tokio::sync::Mutex<AlertStore<B>>>;

impl<B: AlertBackend> AlertStore<B> {
    /// Load the persisted set; later records win on duplicate keys
    pub async fn load(backend: B) -> Result<Self> {
        let alerts = backend
            .load()
            .await?
            .into_iter()
            .map(|a| (a.key(), a))
            .collect::<HashMap<_, _>>();
        tracing::info!(count = alerts.len(), "Loaded price alerts");
        Ok(Self { alerts, backend })
    }

    pub fn into_shared(self) -> SharedAlertStore<B> {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn get(&self, user_id: i64, symbol: &str) -> Option<&PriceAlert> {
        self.alerts.get(&AlertKey::new(user_id, symbol))
    }

    /// Insert or overwrite; returns the alert that was replaced
    ///
    /// If the write fails the previous in-memory state is restored.
    pub async fn add(&mut self, alert: PriceAlert) -> Result<Option<PriceAlert>> {
        let key = alert.key();
        let previous = self.alerts.insert(key.clone(), alert);
        if let Err(e) = self.save().await {
            match previous {
                Some(prev) => self.alerts.insert(key, prev),
                None => self.alerts.remove(&key),
            };
            return Err(e);
        }
        Ok(previous)
    }

    pub async fn remove(&mut self, user_id: i64, symbol: &str) -> Result<Option<PriceAlert>> {
        let key = AlertKey::new(user_id, symbol);
        let Some(removed) = self.alerts.remove(&key) else {
            return Ok(None);
        };
        if let Err(e) = self.save().await {
            self.alerts.insert(key, removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    /// Remove `alert` only if the stored record is still identical
    pub async fn remove_if_matches(&mut self, alert: &PriceAlert) -> Result<bool> {
        let key = alert.key();
        if self.alerts.get(&key) != Some(alert) {
            return Ok(false);
        }
        self.alerts.remove(&key);
        if let Err(e) = self.save().await {
            self.alerts.insert(key, alert.clone());
            return Err(e);
        }
        Ok(true)
    }

    /// A user's alerts, sorted by symbol
    pub fn for_user(&self, user_id: i64) -> Vec<PriceAlert> {
        let mut alerts: Vec<_> = self
            .alerts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| a.token_symbol.cmp(&b.token_symbol));
        alerts
    }

    /// Every alert, sorted by user then symbol
    pub fn all(&self) -> Vec<PriceAlert> {
        let mut alerts: Vec<_> = self.alerts.values().cloned().collect();
        alerts.sort_by(|a, b| {
            a.user_id
                .cmp(&b.user_id)
                .then_with(|| a.token_symbol.cmp(&b.token_symbol))
        });
        alerts
    }

    /// Distinct uppercased symbols with at least one alert
    pub fn tracked_symbols(&self) -> BTreeSet<String> {
        self.alerts.keys().map(|k| k.symbol_upper.clone()).collect()
    }

    pub fn alerts_for_symbol(&self, symbol: &str) -> Vec<PriceAlert> {
        let wanted = symbol.to_uppercase();
        self.alerts
            .iter()
            .filter(|(k, _)| k.symbol_upper == wanted)
            .map(|(_, a)| a.clone())
            .collect()
    }

    /// Rewrite the whole set through the backend
    pub async fn save(&self) -> Result<()> {
        self.backend.save(&self.all()).await
    }
}
