//! Reply texts (Telegram Markdown)

use crate::alerts::{Direction, PriceAlert};
use crate::tokens::TokenRegistry;
use std::fmt::Write;

pub const FALLBACK: &str =
    "I didn't understand that command. Use /help to see available commands.";
pub const UNKNOWN_USER: &str = "Unable to identify user.";
pub const HANDLER_ERROR: &str = "An error occurred. Please try again later.";
pub const NO_ALERTS: &str = "You don't have any active alerts.\n\nUse /alert to set one up!";
pub const REMOVE_USAGE: &str = "Usage: /removealert TOKEN\n\nExample: /removealert PEPE";
pub const BAD_DIRECTION: &str =
    "❌ Direction must be \"above\" or \"below\".\n\nExample: /alert PEPE above 0.00001";
pub const BAD_PRICE: &str = "❌ Invalid price. Please provide a positive number.";
pub const WEBAPP_BUTTON: &str = "🌐 Open RageQuit";
pub const RAGEQUIT_BUTTON: &str = "🚀 RageQuit Now";

pub const START: &str = "\
🧨 *Welcome to RageGuard*

Your sidekick for *RageKit*. When you're tilted, don't think, *hit the button*.

RageGuard watches prices for you and points you to RageQuit, which exits your degen tokens into stablecoins across multiple chains.

*Available Commands:*
/help - Show this help message
/info - Learn about RageQuit
/chains - View supported chains
/tokens - View tracked degen tokens
/alert - Set a price alert for a token
/alerts - View your active price alerts
/removealert - Remove a price alert
/webapp - Get link to RageQuit web app

Ready to rage quit? Use /webapp to get started!";

pub const HELP: &str = "\
*RageGuard Commands:*

/help - Show this help message
/info - Learn about RageQuit
/chains - View supported chains and stablecoins
/tokens - View tracked degen tokens
/alert - Set a price alert (e.g., /alert PEPE above 0.00001)
/alerts - View your active price alerts
/removealert - Remove a price alert
/webapp - Get link to the RageQuit web application

*Price Alerts:*
Set alerts for tracked tokens and get notified when prices hit your threshold. Each alert fires once.";

pub const INFO: &str = "\
🧨 *About RageQuit*

*What is RageQuit?*
A panic button for degens. Exit all your risk tokens into stablecoins in one go.

*Features:*
• Multi-chain scanning (Ethereum, Base, Arbitrum, Optimism, Polygon)
• Swap routing via the 1inch Aggregation API
• One approval and one swap per token, chain by chain

*Safety:*
Every transaction needs your wallet's approval. RageGuard never sees your private keys.";

pub const ALERT_USAGE: &str = "\
*Set Price Alert*

Usage: `/alert TOKEN above|below PRICE`

*Examples:*
`/alert PEPE above 0.00001` - Alert when PEPE goes above $0.00001
`/alert SHIB below 0.000008` - Alert when SHIB goes below $0.000008
`/alert DEGEN above 0.5` - Alert when DEGEN goes above $0.5

Use /tokens to see all tracked tokens.";

/// Price without trailing zeros
pub fn format_price(price: f64) -> String {
    // f64 Display is already the shortest round-trip form
    format!("{}", price)
}

pub fn chains(registry: &TokenRegistry) -> String {
    let mut out = String::from("*Supported Chains & Stablecoins:*\n");
    for chain in registry.chains() {
        let _ = write!(out, "\n*{}*\n", chain.name);
        for coin in registry.stablecoins(chain.id) {
            let _ = writeln!(out, "• {}: `{}`", coin.symbol, coin.address);
        }
    }
    out.push_str("\nExits land in the first stablecoin listed for each chain.");
    out
}

pub fn tokens(registry: &TokenRegistry) -> String {
    let mut out = String::from("*Tracked Degen Tokens:*\n");
    for chain in registry.chains() {
        let risk = registry.risk_tokens(chain.id);
        if risk.is_empty() {
            continue;
        }
        let _ = write!(out, "\n*{}*\n", chain.name);
        for token in risk {
            let _ = writeln!(out, "• {}: `{}`", token.symbol, token.address);
        }
    }
    out.push_str("\nUse /alert to set price alerts for any of these tokens!");
    out
}

pub fn webapp(url: &str) -> String {
    format!(
        "🌐 *RageQuit Web Application*\n\n\
         Open the link below to access RageQuit:\n\n{}\n\n\
         *Remember:* All transactions require your approval. Stay safe! 🛡️",
        url
    )
}

pub fn unknown_token(symbol: &str) -> String {
    format!(
        "❌ Token \"{}\" not found in tracked tokens.\n\nUse /tokens to see available tokens.",
        symbol
    )
}

pub fn no_price_tracking(symbol: &str) -> String {
    format!("❌ Price tracking not available for {} yet.", symbol)
}

pub fn alert_exists(symbol: &str) -> String {
    format!(
        "⚠️ You already have an alert for {0}. Use /removealert {0} first, or I'll update it.",
        symbol
    )
}

pub fn alert_set(symbol: &str, direction: Direction, threshold: f64) -> String {
    format!(
        "✅ Alert set!\n\n{} {} {} ${}\n\nI'll notify you when the price hits this threshold!",
        direction.emoji(),
        symbol,
        direction,
        format_price(threshold)
    )
}

pub fn alert_list(alerts: &[PriceAlert], registry: &TokenRegistry) -> String {
    let mut out = String::from("*Your Active Alerts:*\n\n");
    for alert in alerts {
        let _ = write!(
            out,
            "{} *{}* {} ${}\n   Chain: {}\n\n",
            alert.direction.emoji(),
            alert.token_symbol,
            alert.direction,
            format_price(alert.threshold),
            registry.chain_name(alert.chain_id)
        );
    }
    out.push_str("Use /removealert TOKEN to remove an alert.");
    out
}

pub fn no_alert_found(symbol: &str) -> String {
    format!(
        "❌ No alert found for {}.\n\nUse /alerts to see your active alerts.",
        symbol
    )
}

pub fn alert_removed(symbol: &str) -> String {
    format!("✅ Alert for {} removed.", symbol)
}

pub fn alert_triggered(alert: &PriceAlert, price: f64, chain_name: &str) -> String {
    format!(
        "🚨 *Price Alert Triggered!*\n\n\
         {} *{}* is now {} ${}\n\n\
         *Current Price:* ${}\n\
         *Chain:* {}\n\n\
         *Time to RageQuit!* 🧨",
        alert.direction.emoji(),
        alert.token_symbol,
        alert.direction,
        format_price(alert.threshold),
        format_price(price),
        chain_name
    )
}
