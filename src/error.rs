//! Error types for RageKit

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Chain {0} not supported by the swap aggregator")]
    UnsupportedChain(u64),

    #[error("Aggregator API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("An exit is already in progress")]
    ExitInProgress,

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
