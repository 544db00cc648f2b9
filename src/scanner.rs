//! Multi-chain balance scanner
//!
//! Reads native and ERC20 balances for an account across every chain in the
//! registry and returns the nonzero ones as [`Holding`]s.
//!
//! Read-only: it never submits transactions. A failed read for one
//! (chain, token) pair is logged and skipped, never retried.

use crate::config::RpcConfig;
use crate::tokens::{TokenRegistry, NATIVE_ASSET};
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

/// A nonzero balance of one token (or the native asset) on one chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub chain_id: u64,
    pub chain_name: String,
    /// Token contract, or [`NATIVE_ASSET`] for the chain's native currency
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    /// Human-readable balance
    pub balance: String,
    /// Balance in the token's smallest unit
    pub raw_balance: U256,
}

impl Holding {
    pub fn is_native(&self) -> bool {
        self.address == NATIVE_ASSET
    }
}

/// Source of on-chain balances
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// Native currency balance of `account` on `chain_id`
    async fn native_balance(&self, chain_id: u64, account: Address) -> Result<U256>;

    /// ERC20 `balanceOf(account)` for `token` on `chain_id`
    async fn token_balance(&self, chain_id: u64, token: Address, account: Address)
        -> Result<U256>;
}

/// [`BalanceReader`] backed by JSON-RPC endpoints
pub struct RpcBalanceReader {
    rpc: RpcConfig,
}

impl RpcBalanceReader {
    pub fn new(rpc: RpcConfig) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl BalanceReader for RpcBalanceReader {
    async fn native_balance(&self, chain_id: u64, account: Address) -> Result<U256> {
        let provider = self.rpc.provider(chain_id)?;
        provider
            .get_balance(account)
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get balance: {}", e)))
    }

    async fn token_balance(
        &self,
        chain_id: u64,
        token: Address,
        account: Address,
    ) -> Result<U256> {
        let provider = self.rpc.provider(chain_id)?;

        let tx = TransactionRequest::default()
            .to(token)
            .input(balance_of_calldata(account).into());

        let result = provider
            .call(tx)
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get token balance: {}", e)))?;

        Ok(if result.len() >= 32 {
            U256::from_be_slice(&result[..32])
        } else {
            U256::ZERO
        })
    }
}

/// ERC20 balanceOf(address) calldata: selector + padded address
fn balance_of_calldata(account: Address) -> Bytes {
    let mut calldata = vec![0x70, 0xa0, 0x82, 0x31];
    calldata.extend_from_slice(&[0u8; 12]);
    calldata.extend_from_slice(account.as_slice());
    Bytes::from(calldata)
}

/// Scans every registered chain for nonzero holdings
pub struct BalanceScanner<R> {
    reader: R,
    registry: TokenRegistry,
}

impl<R: BalanceReader> BalanceScanner<R> {
    pub fn new(reader: R, registry: TokenRegistry) -> Self {
        Self { reader, registry }
    }

    /// Scan all chains for `account`
    ///
    /// Chains are visited in registry order; per chain, risk tokens come first
    /// and the native asset last.
    pub async fn scan(&self, account: Address) -> Vec<Holding> {
        let mut holdings = Vec::new();

        for chain in self.registry.chains() {
            for token in self.registry.risk_tokens(chain.id) {
                match self
                    .reader
                    .token_balance(chain.id, token.address, account)
                    .await
                {
                    Ok(raw) if !raw.is_zero() => holdings.push(Holding {
                        chain_id: chain.id,
                        chain_name: chain.name.to_string(),
                        address: token.address,
                        symbol: token.symbol.to_string(),
                        decimals: token.decimals,
                        balance: format_units(raw, token.decimals as u32),
                        raw_balance: raw,
                    }),
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(
                            chain = chain.name,
                            symbol = token.symbol,
                            error = %e,
                            "Failed to fetch token balance"
                        );
                    }
                }
            }

            match self.reader.native_balance(chain.id, account).await {
                Ok(raw) if !raw.is_zero() => holdings.push(Holding {
                    chain_id: chain.id,
                    chain_name: chain.name.to_string(),
                    address: NATIVE_ASSET,
                    symbol: chain.native_symbol.to_string(),
                    decimals: chain.native_decimals,
                    balance: format_units(raw, chain.native_decimals as u32),
                    raw_balance: raw,
                }),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(chain = chain.name, error = %e, "Failed to fetch native balance");
                }
            }
        }

        tracing::info!(
            account = %account,
            holdings = holdings.len(),
            "Balance scan complete"
        );
        holdings
    }
}

/// Format a U256 value with decimals
pub fn format_units(value: U256, decimals: u32) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let remainder_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = remainder_str.trim_end_matches('0');
        format!("{}.{}", whole, trimmed)
    }
}
