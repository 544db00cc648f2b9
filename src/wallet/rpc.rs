//! Node-managed account wallet
//!
//! Sends unsigned transactions with `eth_sendTransaction` and lets the node
//! sign them. Only usable against endpoints that manage the account (a local
//! node, an Anvil fork, a custodial RPC).

use super::{TransactionPayload, WalletClient};
use crate::config::RpcConfig;
use crate::{Error, Result};
use alloy::primitives::{Address, TxHash};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct RpcWallet {
    rpc: RpcConfig,
    address: Address,
    active_chain: AtomicU64,
}

impl RpcWallet {
    pub fn new(rpc: RpcConfig, address: Address, initial_chain: u64) -> Self {
        Self {
            rpc,
            address,
            active_chain: AtomicU64::new(initial_chain),
        }
    }

    fn active(&self) -> u64 {
        self.active_chain.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletClient for RpcWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn chain_id(&self) -> Result<u64> {
        // Ask the endpoint rather than trusting our own bookkeeping
        let provider = self.rpc.provider(self.active())?;
        provider
            .get_chain_id()
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get chain id: {}", e)))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        if !self.rpc.has_chain(chain_id) {
            return Err(Error::Wallet(format!(
                "No RPC endpoint configured for chain {}",
                chain_id
            )));
        }
        tracing::info!(from = self.active(), to = chain_id, "Switching chain");
        self.active_chain.store(chain_id, Ordering::SeqCst);
        Ok(())
    }

    async fn send_transaction(&self, tx: TransactionPayload) -> Result<TxHash> {
        let provider = self.rpc.provider(self.active())?;

        let mut request = TransactionRequest::default()
            .from(self.address)
            .to(tx.to)
            .input(tx.data.into())
            .value(tx.value);
        if let Some(gas) = tx.gas {
            request = request.gas_limit(gas);
        }

        let pending = provider
            .send_transaction(request)
            .await
            .map_err(|e| Error::Wallet(format!("Failed to send transaction: {}", e)))?;

        Ok(*pending.tx_hash())
    }

    async fn transaction_status(&self, hash: TxHash) -> Result<Option<bool>> {
        let provider = self.rpc.provider(self.active())?;
        let receipt = provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get receipt: {}", e)))?;

        Ok(receipt.map(|r| r.status()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_switch_to_unconfigured_chain_fails() {
        let mut urls = HashMap::new();
        urls.insert(1, "http://127.0.0.1:8545".to_string());
        let wallet = RpcWallet::new(RpcConfig::with_urls(urls), Address::ZERO, 1);

        assert!(matches!(
            wallet.switch_chain(8453).await,
            Err(Error::Wallet(_))
        ));
        assert_eq!(wallet.active(), 1);
    }
}
