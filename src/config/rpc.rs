//! RPC endpoint configuration
//!
//! Resolution order per chain, following Ethereum ecosystem conventions:
//! 1. Per-chain env vars (ETH_RPC_URL, BASE_RPC_URL, etc.) - highest priority
//! 2. Provider API keys (ALCHEMY_API_KEY, INFURA_API_KEY) - builds URLs automatically
//! 3. Public RPC fallbacks - rate limited
//!
//! # Examples
//!
//! ```bash
//! export ETH_RPC_URL="https://eth-mainnet.g.alchemy.com/v2/YOUR_KEY"
//! export ALCHEMY_API_KEY="YOUR_KEY"   # fills in every chain not set above
//! ```

use crate::tokens::chains;
use crate::{Error, Result};
use alloy::providers::{Provider, ProviderBuilder};
use std::collections::HashMap;

/// RPC configuration for multiple chains
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// RPC URLs indexed by chain ID
    urls: HashMap<u64, String>,
}

/// How to reach one chain
struct ChainEndpoints {
    chain_id: u64,
    env_var: &'static str,
    alchemy_slug: &'static str,
    /// Infura doesn't serve every chain
    infura_slug: Option<&'static str>,
    public_rpc: &'static str,
}

const ENDPOINTS: &[ChainEndpoints] = &[
    ChainEndpoints {
        chain_id: chains::ETHEREUM,
        env_var: "ETH_RPC_URL",
        alchemy_slug: "eth-mainnet",
        infura_slug: Some("mainnet"),
        public_rpc: "https://eth.llamarpc.com",
    },
    ChainEndpoints {
        chain_id: chains::BASE,
        env_var: "BASE_RPC_URL",
        alchemy_slug: "base-mainnet",
        infura_slug: None,
        public_rpc: "https://mainnet.base.org",
    },
    ChainEndpoints {
        chain_id: chains::ARBITRUM,
        env_var: "ARBITRUM_RPC_URL",
        alchemy_slug: "arb-mainnet",
        infura_slug: Some("arbitrum-mainnet"),
        public_rpc: "https://arb1.arbitrum.io/rpc",
    },
    ChainEndpoints {
        chain_id: chains::OPTIMISM,
        env_var: "OPTIMISM_RPC_URL",
        alchemy_slug: "opt-mainnet",
        infura_slug: Some("optimism-mainnet"),
        public_rpc: "https://mainnet.optimism.io",
    },
    ChainEndpoints {
        chain_id: chains::POLYGON,
        env_var: "POLYGON_RPC_URL",
        alchemy_slug: "polygon-mainnet",
        infura_slug: Some("polygon-mainnet"),
        public_rpc: "https://polygon-rpc.com",
    },
];

const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
const INFURA_API_KEY: &str = "INFURA_API_KEY";

impl RpcConfig {
    /// Create RPC config from environment variables
    pub fn from_env() -> Self {
        Self::resolve(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
    }

    /// Resolve URLs using `lookup` for environment values
    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let alchemy = lookup(ALCHEMY_API_KEY);
        let infura = lookup(INFURA_API_KEY);
        let mut urls = HashMap::new();

        for ep in ENDPOINTS {
            let url = if let Some(url) = lookup(ep.env_var) {
                tracing::debug!(chain_id = ep.chain_id, "Using {}", ep.env_var);
                url
            } else if let Some(key) = &alchemy {
                format!("https://{}.g.alchemy.com/v2/{}", ep.alchemy_slug, key)
            } else if let (Some(key), Some(slug)) = (&infura, ep.infura_slug) {
                format!("https://{}.infura.io/v3/{}", slug, key)
            } else {
                tracing::debug!(
                    chain_id = ep.chain_id,
                    "No RPC configured, using public RPC (rate limited)"
                );
                ep.public_rpc.to_string()
            };
            urls.insert(ep.chain_id, url);
        }

        Self { urls }
    }

    /// Create with explicit RPC URLs
    pub fn with_urls(urls: HashMap<u64, String>) -> Self {
        Self { urls }
    }

    /// Get RPC URL for a chain
    pub fn get(&self, chain_id: u64) -> Option<&str> {
        self.urls.get(&chain_id).map(|s| s.as_str())
    }

    /// Check if a chain is configured
    pub fn has_chain(&self, chain_id: u64) -> bool {
        self.urls.contains_key(&chain_id)
    }

    /// Build an HTTP provider for a chain
    pub fn provider(&self, chain_id: u64) -> Result<impl Provider> {
        let rpc_url = self.get(chain_id).ok_or_else(|| {
            Error::Rpc(format!("No RPC URL configured for chain {}", chain_id))
        })?;
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL for chain {}: {}", chain_id, e)))?;

        Ok(ProviderBuilder::new().connect_http(url))
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
