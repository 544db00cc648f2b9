//! Dry-run wallet
//!
//! Records every transaction instead of submitting it. Chain switches take
//! effect immediately and every recorded transaction reports success.

use super::{TransactionPayload, WalletClient};
use crate::Result;
use alloy::primitives::{Address, TxHash, B256, U256};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// A transaction captured by [`DryRunWallet`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTransaction {
    pub chain_id: u64,
    pub hash: TxHash,
    pub payload: TransactionPayload,
}

pub struct DryRunWallet {
    address: Address,
    active_chain: AtomicU64,
    sent: Mutex<Vec<RecordedTransaction>>,
}

impl DryRunWallet {
    pub fn new(address: Address, initial_chain: u64) -> Self {
        Self {
            address,
            active_chain: AtomicU64::new(initial_chain),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Transactions recorded so far, in submission order
    pub async fn sent(&self) -> Vec<RecordedTransaction> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl WalletClient for DryRunWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.active_chain.load(Ordering::SeqCst))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        self.active_chain.store(chain_id, Ordering::SeqCst);
        Ok(())
    }

    async fn send_transaction(&self, tx: TransactionPayload) -> Result<TxHash> {
        let mut sent = self.sent.lock().await;
        // Sequence number as a synthetic hash
        let hash = B256::from(U256::from(sent.len() as u64 + 1));
        let chain_id = self.active_chain.load(Ordering::SeqCst);

        tracing::info!(chain_id, to = %tx.to, hash = %hash, "Dry run: transaction recorded");
        sent.push(RecordedTransaction {
            chain_id,
            hash,
            payload: tx,
        });
        Ok(hash)
    }

    async fn transaction_status(&self, _hash: TxHash) -> Result<Option<bool>> {
        Ok(Some(true))
    }
}
