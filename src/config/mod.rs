//! Configuration for RageKit

pub mod rpc;

use crate::{Error, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

// Re-export RPC config
pub use rpc::RpcConfig;

/// Telegram bot token environment variable name
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
/// Aggregator API key environment variable name
pub const AGGREGATOR_API_KEY_ENV: &str = "ONEINCH_API_KEY";
/// Web app base URL environment variable name
pub const WEBAPP_URL_ENV: &str = "WEBAPP_URL";

const DEFAULT_WEBAPP_URL: &str = "http://localhost:3000";

/// Swap aggregator endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Base URL of the swap API (chain id is appended as a path segment)
    #[serde(default = "default_swap_api")]
    pub swap_base_url: String,
    /// Base URL of the spot price API used for price health
    #[serde(default = "default_price_api")]
    pub price_base_url: String,
}

fn default_swap_api() -> String {
    "https://api.1inch.dev/swap/v6.0".to_string()
}

fn default_price_api() -> String {
    "https://api.1inch.dev/price/v1.1".to_string()
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            swap_base_url: default_swap_api(),
            price_base_url: default_price_api(),
        }
    }
}

/// Batch exit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitConfig {
    /// Slippage tolerance applied to every swap (e.g., 3.0 for 3%)
    #[serde(default = "default_slippage")]
    pub slippage_percent: f64,
    /// How long to wait for the wallet to report the requested chain
    #[serde(default = "default_chain_switch_timeout")]
    pub chain_switch_timeout_ms: u64,
    /// How long to wait for a transaction receipt
    #[serde(default = "default_receipt_timeout")]
    pub receipt_timeout_ms: u64,
    /// Poll interval for chain switch and receipt confirmation
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Delay before a finished exit resets its status to idle
    #[serde(default = "default_reset_delay")]
    pub reset_delay_ms: u64,
    /// Path to the exit journal (JSONL)
    #[serde(default = "default_journal_path")]
    pub journal_path: Option<String>,
}

fn default_slippage() -> f64 {
    3.0
}

fn default_chain_switch_timeout() -> u64 {
    15_000
}

fn default_receipt_timeout() -> u64 {
    300_000
}

fn default_poll_interval() -> u64 {
    1_000
}

fn default_reset_delay() -> u64 {
    5_000
}

fn default_journal_path() -> Option<String> {
    Some("exit_journal.jsonl".to_string())
}

impl ExitConfig {
    pub fn chain_switch_timeout(&self) -> Duration {
        Duration::from_millis(self.chain_switch_timeout_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            slippage_percent: default_slippage(),
            chain_switch_timeout_ms: default_chain_switch_timeout(),
            receipt_timeout_ms: default_receipt_timeout(),
            poll_interval_ms: default_poll_interval(),
            reset_delay_ms: default_reset_delay(),
            journal_path: default_journal_path(),
        }
    }
}

/// Price alert settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Path to the persisted alert file
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Price poll interval (milliseconds)
    #[serde(default = "default_check_interval")]
    pub check_interval_ms: u64,
    /// CoinGecko API base URL
    #[serde(default = "default_coingecko_api")]
    pub price_feed_url: String,
}

fn default_store_path() -> String {
    "data/alerts.json".to_string()
}

fn default_check_interval() -> u64 {
    60_000
}

fn default_coingecko_api() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

impl AlertConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            check_interval_ms: default_check_interval(),
            price_feed_url: default_coingecko_api(),
        }
    }
}

/// Chat bot transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Telegram Bot API base URL
    #[serde(default = "default_telegram_api")]
    pub api_base_url: String,
    /// Long-poll timeout for getUpdates (seconds)
    #[serde(default = "default_long_poll")]
    pub long_poll_timeout_secs: u64,
    /// Pause after a failed getUpdates call (milliseconds)
    #[serde(default = "default_error_backoff")]
    pub error_backoff_ms: u64,
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

fn default_long_poll() -> u64 {
    30
}

fn default_error_backoff() -> u64 {
    5_000
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_telegram_api(),
            long_poll_timeout_secs: default_long_poll(),
            error_backoff_ms: default_error_backoff(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub exit: ExitConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

impl Config {
    /// Load from a JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Values read from the process environment
///
/// Secrets are held in `SecretString` and never logged.
#[derive(Debug)]
pub struct Secrets {
    pub bot_token: Option<SecretString>,
    pub aggregator_api_key: Option<SecretString>,
    pub webapp_url: Url,
}

impl Secrets {
    pub fn from_env() -> Result<Self> {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let webapp_raw = non_empty(WEBAPP_URL_ENV).unwrap_or_else(|| DEFAULT_WEBAPP_URL.to_string());
        let webapp_url = Url::parse(&webapp_raw)
            .map_err(|e| Error::Config(format!("Invalid {}: {}", WEBAPP_URL_ENV, e)))?;

        Ok(Self {
            bot_token: non_empty(BOT_TOKEN_ENV).map(SecretString::from),
            aggregator_api_key: non_empty(AGGREGATOR_API_KEY_ENV).map(SecretString::from),
            webapp_url,
        })
    }

    /// The bot token, which the bot cannot start without
    pub fn require_bot_token(&self) -> Result<&SecretString> {
        self.bot_token.as_ref().ok_or_else(|| {
            Error::Config(format!(
                "{} is not set in environment variables",
                BOT_TOKEN_ENV
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_deserialize_defaults() {
        let parsed: Config = serde_json::from_value(serde_json::json!({})).expect("parse config");
        assert_eq!(parsed.exit.slippage_percent, 3.0);
        assert_eq!(parsed.alerts.store_path, "data/alerts.json");
        assert_eq!(parsed.alerts.check_interval(), Duration::from_secs(60));
        assert_eq!(parsed.bot.long_poll_timeout_secs, 30);
        assert_eq!(
            parsed.aggregator.swap_base_url,
            "https://api.1inch.dev/swap/v6.0"
        );
    }

    #[test]
    fn config_deserialize_explicit() {
        let value = serde_json::json!({
            "exit": {
                "slippage_percent": 1.5,
                "receipt_timeout_ms": 1000,
                "journal_path": null
            },
            "alerts": {
                "store_path": "/tmp/alerts.json",
                "check_interval_ms": 5000
            }
        });
        let parsed: Config = serde_json::from_value(value).expect("parse config");
        assert_eq!(parsed.exit.slippage_percent, 1.5);
        assert_eq!(parsed.exit.receipt_timeout(), Duration::from_secs(1));
        assert!(parsed.exit.journal_path.is_none());
        assert_eq!(parsed.exit.poll_interval_ms, 1_000);
        assert_eq!(parsed.alerts.store_path, "/tmp/alerts.json");
        assert_eq!(parsed.alerts.price_feed_url, "https://api.coingecko.com/api/v3");
    }

    #[test]
    fn missing_bot_token_is_a_config_error() {
        let secrets = Secrets {
            bot_token: None,
            aggregator_api_key: None,
            webapp_url: Url::parse(DEFAULT_WEBAPP_URL).unwrap(),
        };
        assert!(matches!(secrets.require_bot_token(), Err(Error::Config(_))));
    }
}
