//! RageKit
//!
//! A panic button for degens:
//! - Scan an account's risk-token balances across EVM chains
//! - Exit every holding into the chain's default stablecoin via 1inch
//! - Watch prices and ping Telegram users when their alerts trigger (RageGuard)
//!
//! # Security Model
//!
//! - No private keys are held; transactions go through a node-managed
//!   account or are only recorded in dry-run mode
//! - Aggregator responses only prepare transactions, never sign them
//! - Bot token and API keys stay in `SecretString` and are never logged

pub mod aggregator;
pub mod alerts;
pub mod bot;
pub mod config;
pub mod exit;
pub mod prices;
pub mod runner;
pub mod scanner;
pub mod tokens;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use config::{Config, RpcConfig, Secrets};
pub use error::{Error, Result};
pub use exit::{ExitOrchestrator, ExitReport, ExitStatus};
pub use runner::BotRunner;
pub use scanner::{BalanceScanner, Holding};
