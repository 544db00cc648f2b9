//! Wallet access for the exit flow
//!
//! SECURITY: RageKit never holds private keys. Transactions are either sent
//! through a node-managed account (`eth_sendTransaction`) or recorded by the
//! dry-run wallet without leaving the process.

mod dry_run;
mod rpc;

pub use dry_run::{DryRunWallet, RecordedTransaction};
pub use rpc::RpcWallet;

use crate::Result;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use serde::Serialize;

/// A prepared transaction ready for submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionPayload {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas: Option<u64>,
}

#[async_trait]
pub trait WalletClient: Send + Sync {
    /// The account that owns the holdings
    fn address(&self) -> Address;

    /// Chain the wallet is currently connected to
    async fn chain_id(&self) -> Result<u64>;

    /// Ask the wallet to move to another chain
    ///
    /// Returning `Ok` does not mean the switch is done; callers confirm by
    /// polling [`WalletClient::chain_id`].
    async fn switch_chain(&self, chain_id: u64) -> Result<()>;

    /// Submit a transaction on the active chain
    async fn send_transaction(&self, tx: TransactionPayload) -> Result<TxHash>;

    /// `None` while pending, `Some(true)` once mined successfully,
    /// `Some(false)` if it reverted
    async fn transaction_status(&self, hash: TxHash) -> Result<Option<bool>>;
}
