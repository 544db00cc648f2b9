//! Chain and token registry
//!
//! Static configuration shared by the balance scanner, the exit orchestrator
//! and the alert bot: supported chains, tracked risk tokens, stablecoin
//! destinations, the aggregator chain-id mapping and CoinGecko ids.
//!
//! This module is the single source of truth for token information.

use alloy::primitives::{address, Address};
use std::collections::HashMap;

/// Sentinel address used for a chain's native asset
pub const NATIVE_ASSET: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

/// Chain ID constants
pub mod chains {
    pub const ETHEREUM: u64 = 1;
    pub const OPTIMISM: u64 = 10;
    pub const POLYGON: u64 = 137;
    pub const BASE: u64 = 8453;
    pub const ARBITRUM: u64 = 42161;
}

/// Well-known token addresses per chain
pub mod addresses {
    use super::*;

    // === Ethereum Mainnet ===
    pub const USDC_ETH: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    pub const USDT_ETH: Address = address!("dac17f958d2ee523a2206206994597c13d831ec7");
    pub const PEPE_ETH: Address = address!("6982508145454ce325ddbe47a25d4ec3d2311933");
    pub const SHIB_ETH: Address = address!("95ad61b0a150d79219dcf64e1e6cc01f0b64c4ce");

    // === Base ===
    pub const USDC_BASE: Address = address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913");
    pub const DEGEN_BASE: Address = address!("4ed4e862860bed51a9570b96d89af5e1b0efefed");
    pub const BRETT_BASE: Address = address!("532f27101965dd16442e59d40670faf5ebb142e4");
    pub const TOBY_BASE: Address = address!("9fe8e567ee8ce5bdb5bb96cf5d0b0bd4f5c0b5b5");
    pub const PORK_BASE: Address = address!("57f1887a8bf19b14fc0df6fd9b2acc9af147ea85");

    // === Arbitrum ===
    pub const USDC_ARB: Address = address!("af88d065e77c8cc2239327c5edb3a432268e5831");
    pub const USDT_ARB: Address = address!("fd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9");

    // === Optimism ===
    pub const USDC_OPT: Address = address!("0b2c639c533813f4aa9d7837caf62653d097ff85");

    // === Polygon ===
    pub const USDC_POLYGON: Address = address!("3c499c542cef5e3811e1192ce70d8cc03d5c3359");
    pub const USDT_POLYGON: Address = address!("c2132d05d31c914a87c6611c10748aeb04b58e8f");
}

/// A supported chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInfo {
    pub id: u64,
    /// Display name used in bot replies and holdings
    pub name: &'static str,
    pub native_symbol: &'static str,
    pub native_decimals: u8,
    /// The aggregator's own identifier for this chain, if it routes swaps here
    pub aggregator_id: Option<u64>,
}

/// Token metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub chain_id: u64,
    pub address: Address,
    pub symbol: &'static str,
    pub decimals: u8,
}

impl TokenInfo {
    pub const fn new(chain_id: u64, address: Address, symbol: &'static str, decimals: u8) -> Self {
        Self {
            chain_id,
            address,
            symbol,
            decimals,
        }
    }
}

/// Destination asset for an exit; the first entry per chain is the default
pub type StablecoinTarget = TokenInfo;

/// Token registry providing chain and token lookups
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    /// Chains in scan order
    chains: Vec<ChainInfo>,
    /// Tracked risk tokens per chain
    risk_tokens: HashMap<u64, Vec<TokenInfo>>,
    /// Stablecoin destinations per chain, default first
    stablecoins: HashMap<u64, Vec<StablecoinTarget>>,
    /// Uppercased symbol -> CoinGecko id
    coingecko_ids: HashMap<String, &'static str>,
}

impl TokenRegistry {
    /// Create the registry with every supported chain and tracked token
    pub fn new() -> Self {
        use addresses::*;

        let chain = |id, name, native_symbol| ChainInfo {
            id,
            name,
            native_symbol,
            native_decimals: 18,
            aggregator_id: Some(id),
        };

        Self::empty()
            .with_chain(chain(chains::ETHEREUM, "Ethereum", "ETH"))
            .with_chain(chain(chains::BASE, "Base", "ETH"))
            .with_chain(chain(chains::ARBITRUM, "Arbitrum", "ETH"))
            .with_chain(chain(chains::OPTIMISM, "Optimism", "ETH"))
            .with_chain(chain(chains::POLYGON, "Polygon", "POL"))
            // Stablecoins
            .with_stablecoin(TokenInfo::new(chains::ETHEREUM, USDC_ETH, "USDC", 6))
            .with_stablecoin(TokenInfo::new(chains::ETHEREUM, USDT_ETH, "USDT", 6))
            .with_stablecoin(TokenInfo::new(chains::BASE, USDC_BASE, "USDC", 6))
            .with_stablecoin(TokenInfo::new(chains::ARBITRUM, USDC_ARB, "USDC", 6))
            .with_stablecoin(TokenInfo::new(chains::ARBITRUM, USDT_ARB, "USDT", 6))
            .with_stablecoin(TokenInfo::new(chains::OPTIMISM, USDC_OPT, "USDC", 6))
            .with_stablecoin(TokenInfo::new(chains::POLYGON, USDC_POLYGON, "USDC", 6))
            .with_stablecoin(TokenInfo::new(chains::POLYGON, USDT_POLYGON, "USDT", 6))
            // Risk tokens
            .with_risk_token(TokenInfo::new(chains::ETHEREUM, PEPE_ETH, "PEPE", 18), Some("pepe"))
            .with_risk_token(TokenInfo::new(chains::ETHEREUM, SHIB_ETH, "SHIB", 18), Some("shiba-inu"))
            .with_risk_token(TokenInfo::new(chains::BASE, DEGEN_BASE, "DEGEN", 18), Some("degen-base"))
            .with_risk_token(TokenInfo::new(chains::BASE, BRETT_BASE, "BRETT", 18), Some("brett-base"))
            .with_risk_token(TokenInfo::new(chains::BASE, TOBY_BASE, "TOBY", 18), Some("toby-the-token"))
            .with_risk_token(TokenInfo::new(chains::BASE, PORK_BASE, "PORK", 18), Some("pepefork"))
    }

    /// A registry with no chains or tokens
    pub fn empty() -> Self {
        Self {
            chains: Vec::new(),
            risk_tokens: HashMap::new(),
            stablecoins: HashMap::new(),
            coingecko_ids: HashMap::new(),
        }
    }

    pub fn with_chain(mut self, chain: ChainInfo) -> Self {
        self.chains.retain(|c| c.id != chain.id);
        self.chains.push(chain);
        self
    }

    pub fn with_stablecoin(mut self, token: StablecoinTarget) -> Self {
        self.stablecoins.entry(token.chain_id).or_default().push(token);
        self
    }

    pub fn with_risk_token(mut self, token: TokenInfo, coingecko_id: Option<&'static str>) -> Self {
        if let Some(id) = coingecko_id {
            self.coingecko_ids.insert(token.symbol.to_uppercase(), id);
        }
        self.risk_tokens.entry(token.chain_id).or_default().push(token);
        self
    }

    /// Supported chains in scan order
    pub fn chains(&self) -> &[ChainInfo] {
        &self.chains
    }

    pub fn chain(&self, chain_id: u64) -> Option<&ChainInfo> {
        self.chains.iter().find(|c| c.id == chain_id)
    }

    /// Display name for a chain, falling back to "Chain <id>"
    pub fn chain_name(&self, chain_id: u64) -> String {
        self.chain(chain_id)
            .map(|c| c.name.to_string())
            .unwrap_or_else(|| format!("Chain {}", chain_id))
    }

    /// Resolve a chain from a numeric id or a (case-insensitive) name
    pub fn resolve_chain(&self, input: &str) -> Option<&ChainInfo> {
        if let Ok(id) = input.trim().parse::<u64>() {
            return self.chain(id);
        }
        let wanted = match input.trim().to_lowercase().as_str() {
            "mainnet" | "eth" => "ethereum".to_string(),
            "arbitrum-one" | "arb" => "arbitrum".to_string(),
            "op" => "optimism".to_string(),
            "matic" => "polygon".to_string(),
            other => other.to_string(),
        };
        self.chains.iter().find(|c| c.name.to_lowercase() == wanted)
    }

    /// The aggregator's identifier for a chain
    pub fn aggregator_chain_id(&self, chain_id: u64) -> Option<u64> {
        self.chain(chain_id).and_then(|c| c.aggregator_id)
    }

    /// Risk tokens to scan on a chain
    pub fn risk_tokens(&self, chain_id: u64) -> &[TokenInfo] {
        self.risk_tokens
            .get(&chain_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Stablecoin destinations on a chain, default first
    pub fn stablecoins(&self, chain_id: u64) -> &[StablecoinTarget] {
        self.stablecoins
            .get(&chain_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The default exit destination for a chain
    pub fn default_stablecoin(&self, chain_id: u64) -> Option<&StablecoinTarget> {
        self.stablecoins(chain_id).first()
    }

    /// Every tracked risk token, in chain order
    pub fn tracked_tokens(&self) -> impl Iterator<Item = &TokenInfo> {
        self.chains
            .iter()
            .flat_map(move |c| self.risk_tokens(c.id).iter())
    }

    /// Find a tracked risk token by symbol (case-insensitive)
    pub fn find_tracked(&self, symbol: &str) -> Option<&TokenInfo> {
        self.tracked_tokens()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// CoinGecko id used for symbol price lookups
    pub fn coingecko_id(&self, symbol: &str) -> Option<&'static str> {
        self.coingecko_ids.get(&symbol.to_uppercase()).copied()
    }
}

/// Global token registry (lazy initialized)
static REGISTRY: std::sync::OnceLock<TokenRegistry> = std::sync::OnceLock::new();

/// Get the global token registry
pub fn registry() -> &'static TokenRegistry {
    REGISTRY.get_or_init(TokenRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stablecoin_is_first_entry() {
        let registry = TokenRegistry::new();

        let eth = registry.default_stablecoin(chains::ETHEREUM).unwrap();
        assert_eq!(eth.symbol, "USDC");
        assert_eq!(eth.address, addresses::USDC_ETH);
        assert_eq!(registry.stablecoins(chains::ETHEREUM).len(), 2);

        let polygon = registry.default_stablecoin(chains::POLYGON).unwrap();
        assert_eq!(polygon.address, addresses::USDC_POLYGON);

        assert!(registry.default_stablecoin(999).is_none());
    }

    #[test]
    fn test_risk_tokens_per_chain() {
        let registry = TokenRegistry::new();

        let eth: Vec<_> = registry
            .risk_tokens(chains::ETHEREUM)
            .iter()
            .map(|t| t.symbol)
            .collect();
        assert_eq!(eth, vec!["PEPE", "SHIB"]);
        assert_eq!(registry.risk_tokens(chains::BASE).len(), 4);
        assert!(registry.risk_tokens(chains::POLYGON).is_empty());
    }

    #[test]
    fn test_find_tracked_case_insensitive() {
        let registry = TokenRegistry::new();

        let pepe = registry.find_tracked("pepe").unwrap();
        assert_eq!(pepe.chain_id, chains::ETHEREUM);
        assert_eq!(pepe.address, addresses::PEPE_ETH);
        assert!(registry.find_tracked("DOGE").is_none());
    }

    #[test]
    fn test_coingecko_ids() {
        let registry = TokenRegistry::new();
        assert_eq!(registry.coingecko_id("shib"), Some("shiba-inu"));
        assert_eq!(registry.coingecko_id("PORK"), Some("pepefork"));
        assert_eq!(registry.coingecko_id("USDC"), None);
    }

    #[test]
    fn test_aggregator_mapping() {
        let registry = TokenRegistry::new();
        for chain in registry.chains() {
            assert_eq!(registry.aggregator_chain_id(chain.id), Some(chain.id));
        }
        assert_eq!(registry.aggregator_chain_id(56), None);
    }

    #[test]
    fn test_resolve_chain() {
        let registry = TokenRegistry::new();
        assert_eq!(registry.resolve_chain("base").unwrap().id, chains::BASE);
        assert_eq!(registry.resolve_chain("Mainnet").unwrap().id, chains::ETHEREUM);
        assert_eq!(registry.resolve_chain("42161").unwrap().name, "Arbitrum");
        assert!(registry.resolve_chain("solana").is_none());
    }

    #[test]
    fn test_chain_name_fallback() {
        let registry = TokenRegistry::new();
        assert_eq!(registry.chain_name(10), "Optimism");
        assert_eq!(registry.chain_name(7777), "Chain 7777");
    }

    #[test]
    fn test_global_registry() {
        let reg = registry();
        assert_eq!(reg.chains().len(), 5);
    }
}
