//! Token price feeds
//!
//! Both feeds swallow every failure into `None`; a missing price only means
//! "skip this round".

mod health;

pub use health::{HealthTier, PriceHealthClient, PriceSnapshot};

use crate::tokens::TokenRegistry;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

/// USD spot price by token symbol
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn price_usd(&self, symbol: &str) -> Option<f64>;
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    usd: Option<f64>,
}

/// CoinGecko `simple/price` feed
pub struct CoinGeckoFeed {
    client: Client,
    base_url: String,
    registry: TokenRegistry,
}

impl CoinGeckoFeed {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            registry: TokenRegistry::new(),
        }
    }

    pub fn with_registry(mut self, registry: TokenRegistry) -> Self {
        self.registry = registry;
        self
    }

    async fn fetch(&self, id: &str) -> Result<Option<f64>, reqwest::Error> {
        let body: HashMap<String, UsdQuote> = self
            .client
            .get(format!("{}/simple/price", self.base_url))
            .query(&[("ids", id), ("vs_currencies", "usd")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body
            .get(id)
            .and_then(|q| q.usd)
            .filter(|p| *p > 0.0))
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoFeed {
    async fn price_usd(&self, symbol: &str) -> Option<f64> {
        let Some(id) = self.registry.coingecko_id(symbol) else {
            tracing::debug!(symbol, "No CoinGecko id for symbol");
            return None;
        };

        match self.fetch(id).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "Price fetch failed");
                None
            }
        }
    }
}
