//! Aggregator request and response types

use crate::wallet::TransactionPayload;
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Parameters of an executable swap
#[derive(Debug, Clone)]
pub struct SwapParams {
    pub chain_id: u64,
    pub src: Address,
    pub dst: Address,
    pub amount: U256,
    pub from: Address,
    /// Percent, e.g. 3.0
    pub slippage: f64,
    pub disable_estimate: bool,
}

/// Transaction as returned by the swap endpoint
///
/// Only `to`, `data` and `value` are needed to send it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
    /// Wei, decimal string
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    /// Expected output in the destination token's smallest unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_amount: Option<String>,
    pub tx: TxPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceResponse {
    pub allowance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveTransaction {
    pub to: Address,
    pub data: Bytes,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
}

pub(crate) fn parse_amount(field: &str, raw: &str) -> Result<U256> {
    U256::from_str(raw.trim())
        .map_err(|e| Error::InvalidArgument(format!("Invalid {} '{}': {}", field, raw, e)))
}

impl AllowanceResponse {
    pub fn amount(&self) -> Result<U256> {
        parse_amount("allowance", &self.allowance)
    }
}

impl SwapResponse {
    pub fn dst_amount(&self) -> Result<Option<U256>> {
        self.dst_amount
            .as_deref()
            .map(|raw| parse_amount("dstAmount", raw))
            .transpose()
    }
}

impl TryFrom<&TxPayload> for TransactionPayload {
    type Error = Error;

    fn try_from(tx: &TxPayload) -> Result<Self> {
        Ok(Self {
            to: tx.to,
            data: tx.data.clone(),
            value: parse_amount("value", &tx.value)?,
            gas: tx.gas,
        })
    }
}

impl TryFrom<&ApproveTransaction> for TransactionPayload {
    type Error = Error;

    fn try_from(tx: &ApproveTransaction) -> Result<Self> {
        Ok(Self {
            to: tx.to,
            data: tx.data.clone(),
            value: parse_amount("value", &tx.value)?,
            gas: None,
        })
    }
}
