//! Price health from the aggregator's spot price API

use crate::tokens::TokenRegistry;
use alloy::primitives::Address;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Response of `GET {base}/{chain}/{token}`; numbers arrive as strings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    pub price: String,
    #[serde(default)]
    pub price_change_24h: Option<String>,
}

impl PriceSnapshot {
    pub fn change_24h(&self) -> Option<f64> {
        self.price_change_24h
            .as_deref()
            .and_then(|c| c.trim().parse::<f64>().ok())
            .filter(|c| c.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTier {
    Unknown,
    Healthy,
    Warning,
    Critical,
}

impl HealthTier {
    pub fn classify(change_24h: Option<f64>) -> Self {
        match change_24h {
            None => Self::Unknown,
            Some(c) if c >= 0.0 => Self::Healthy,
            Some(c) if c > -10.0 => Self::Warning,
            Some(_) => Self::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Unknown => "⚪",
            Self::Healthy => "🟢",
            Self::Warning => "🟡",
            Self::Critical => "🔴",
        }
    }
}

pub struct PriceHealthClient {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    registry: TokenRegistry,
}

impl PriceHealthClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<SecretString>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            registry: TokenRegistry::new(),
        }
    }

    pub fn with_registry(mut self, registry: TokenRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Latest snapshot, or `None` on any failure
    pub async fn snapshot(&self, chain_id: u64, token: Address) -> Option<PriceSnapshot> {
        let chain = self.registry.aggregator_chain_id(chain_id)?;
        let mut request = self
            .client
            .get(format!("{}/{}/{}", self.base_url, chain, token));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let result = async {
            request
                .send()
                .await?
                .error_for_status()?
                .json::<PriceSnapshot>()
                .await
        }
        .await;

        match result {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(chain_id, token = %token, error = %e, "Price health fetch failed");
                None
            }
        }
    }

    /// 24h price change in percent
    pub async fn change_24h(&self, chain_id: u64, token: Address) -> Option<f64> {
        self.snapshot(chain_id, token).await?.change_24h()
    }

    pub async fn health(&self, chain_id: u64, token: Address) -> HealthTier {
        HealthTier::classify(self.change_24h(chain_id, token).await)
    }
}
