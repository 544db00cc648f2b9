//! Swap aggregator access
//!
//! The exit orchestrator talks to the aggregator through [`SwapAggregator`];
//! [`OneInchClient`] is the HTTP implementation.
//!
//! SECURITY NOTE: the aggregator only prepares transactions. Nothing here
//! signs or submits anything.

mod client;
mod types;

pub use client::OneInchClient;
pub use types::{AllowanceResponse, ApproveTransaction, SwapParams, SwapResponse, TxPayload};

use crate::Result;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;

/// Slippage sent with read-only quotes
pub const QUOTE_SLIPPAGE_PERCENT: f64 = 1.0;

#[async_trait]
pub trait SwapAggregator: Send + Sync {
    /// Indicative quote for swapping `amount` of `src` into `dst`
    async fn get_swap_quote(
        &self,
        chain_id: u64,
        src: Address,
        dst: Address,
        amount: U256,
        from: Address,
    ) -> Result<SwapResponse>;

    /// Executable swap transaction
    async fn get_swap_transaction(&self, params: &SwapParams) -> Result<SwapResponse>;

    /// Current allowance `wallet` has granted the aggregator router for `token`
    async fn check_allowance(&self, chain_id: u64, token: Address, wallet: Address)
        -> Result<U256>;

    /// Approval transaction for `token`; `None` amount means unlimited
    async fn get_approve_transaction(
        &self,
        chain_id: u64,
        token: Address,
        amount: Option<U256>,
    ) -> Result<ApproveTransaction>;
}
