//! 1inch Aggregation API client

use super::types::{AllowanceResponse, ApproveTransaction, SwapParams, SwapResponse};
use super::{SwapAggregator, QUOTE_SLIPPAGE_PERCENT};
use crate::tokens::TokenRegistry;
use crate::{Error, Result};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

/// HTTP client for the swap and approve endpoints
pub struct OneInchClient {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    registry: TokenRegistry,
}

impl OneInchClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<SecretString>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            registry: TokenRegistry::new(),
        }
    }

    /// Use a custom chain registry
    pub fn with_registry(mut self, registry: TokenRegistry) -> Self {
        self.registry = registry;
        self
    }

    fn chain_path(&self, chain_id: u64, path: &str) -> Result<String> {
        let aggregator_chain = self
            .registry
            .aggregator_chain_id(chain_id)
            .ok_or(Error::UnsupportedChain(chain_id))?;
        Ok(format!("{}/{}/{}", self.base_url, aggregator_chain, path))
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let mut request = self.client.get(url).query(query);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(url, status = status.as_u16(), "Aggregator request failed");
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

fn swap_query(params: &SwapParams) -> Vec<(&'static str, String)> {
    vec![
        ("src", params.src.to_string()),
        ("dst", params.dst.to_string()),
        ("amount", params.amount.to_string()),
        ("from", params.from.to_string()),
        ("slippage", params.slippage.to_string()),
        ("disableEstimate", params.disable_estimate.to_string()),
    ]
}

#[async_trait]
impl SwapAggregator for OneInchClient {
    async fn get_swap_quote(
        &self,
        chain_id: u64,
        src: Address,
        dst: Address,
        amount: U256,
        from: Address,
    ) -> Result<SwapResponse> {
        let params = SwapParams {
            chain_id,
            src,
            dst,
            amount,
            from,
            slippage: QUOTE_SLIPPAGE_PERCENT,
            disable_estimate: true,
        };
        self.get_swap_transaction(&params).await
    }

    async fn get_swap_transaction(&self, params: &SwapParams) -> Result<SwapResponse> {
        let url = self.chain_path(params.chain_id, "swap")?;
        tracing::debug!(
            chain_id = params.chain_id,
            src = %params.src,
            dst = %params.dst,
            amount = %params.amount,
            "Requesting swap"
        );
        self.get(&url, &swap_query(params)).await
    }

    async fn check_allowance(
        &self,
        chain_id: u64,
        token: Address,
        wallet: Address,
    ) -> Result<U256> {
        let url = self.chain_path(chain_id, "approve/allowance")?;
        let resp: AllowanceResponse = self
            .get(
                &url,
                &[
                    ("tokenAddress", token.to_string()),
                    ("walletAddress", wallet.to_string()),
                ],
            )
            .await?;
        resp.amount()
    }

    async fn get_approve_transaction(
        &self,
        chain_id: u64,
        token: Address,
        amount: Option<U256>,
    ) -> Result<ApproveTransaction> {
        let url = self.chain_path(chain_id, "approve/transaction")?;
        let mut query = vec![("tokenAddress", token.to_string())];
        if let Some(amount) = amount {
            query.push(("amount", amount.to_string()));
        }
        self.get(&url, &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::chains;

    #[test]
    fn test_chain_path() {
        let client = OneInchClient::new("https://api.1inch.dev/swap/v6.0/", None);
        assert_eq!(
            client.chain_path(chains::BASE, "swap").unwrap(),
            "https://api.1inch.dev/swap/v6.0/8453/swap"
        );
    }

    #[test]
    fn test_unmapped_chain_is_unsupported() {
        let client = OneInchClient::new("http://localhost", None);
        assert!(matches!(
            client.chain_path(999_999, "swap"),
            Err(Error::UnsupportedChain(999_999))
        ));
    }

    #[test]
    fn test_swap_query_carries_slippage() {
        let params = SwapParams {
            chain_id: 1,
            src: Address::repeat_byte(0xaa),
            dst: Address::repeat_byte(0xbb),
            amount: U256::from(1000u64),
            from: Address::repeat_byte(0x42),
            slippage: 3.0,
            disable_estimate: false,
        };
        let query = swap_query(&params);
        assert!(query.contains(&("amount", "1000".to_string())));
        assert!(query.contains(&("slippage", "3".to_string())));
        assert!(query.contains(&("disableEstimate", "false".to_string())));
    }
}
