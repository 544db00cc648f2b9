//! Command parsing and handling
//!
//! Handling is transport-free: [`CommandHandler::handle`] turns a message
//! into replies and the bot loop sends them.

use super::messages;
use super::telegram::InlineButton;
use crate::alerts::{AlertBackend, Direction, PriceAlert, SharedAlertStore};
use crate::tokens::TokenRegistry;
use crate::Result;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Info,
    Chains,
    Tokens,
    Alert(Vec<String>),
    Alerts,
    RemoveAlert(Vec<String>),
    Webapp,
    /// Anything else, including plain text
    Unknown,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split_whitespace();
        let Some(head) = parts.next() else {
            return Self::Unknown;
        };
        let Some(name) = head.strip_prefix('/') else {
            return Self::Unknown;
        };
        // "/alert@RageGuardBot" addresses this bot in a group
        let name = name.split('@').next().unwrap_or(name);
        let args = || parts.clone().map(str::to_string).collect::<Vec<_>>();

        match name.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "info" => Self::Info,
            "chains" => Self::Chains,
            "tokens" => Self::Tokens,
            "alert" => Self::Alert(args()),
            "alerts" => Self::Alerts,
            "removealert" => Self::RemoveAlert(args()),
            "webapp" => Self::Webapp,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markdown: bool,
    pub button: Option<InlineButton>,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
            button: None,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: true,
            button: None,
        }
    }

    pub fn with_button(mut self, text: &str, url: &Url) -> Self {
        self.button = Some(InlineButton {
            text: text.to_string(),
            url: url.to_string(),
        });
        self
    }
}

pub struct CommandHandler<B> {
    store: SharedAlertStore<B>,
    registry: TokenRegistry,
    webapp_url: Url,
}

impl<B: AlertBackend> CommandHandler<B> {
    pub fn new(store: SharedAlertStore<B>, registry: TokenRegistry, webapp_url: Url) -> Self {
        Self {
            store,
            registry,
            webapp_url,
        }
    }

    /// Replies for one incoming message; never fails
    pub async fn handle(&self, user_id: Option<i64>, text: &str) -> Vec<Reply> {
        let command = Command::parse(text);
        match self.dispatch(user_id, command).await {
            Ok(replies) => replies,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Command failed");
                vec![Reply::plain(messages::HANDLER_ERROR)]
            }
        }
    }

    async fn dispatch(&self, user_id: Option<i64>, command: Command) -> Result<Vec<Reply>> {
        let needs_user = matches!(
            command,
            Command::Alert(_) | Command::Alerts | Command::RemoveAlert(_)
        );
        let user_id = match user_id {
            Some(id) => id,
            None if needs_user => return Ok(vec![Reply::plain(messages::UNKNOWN_USER)]),
            None => 0,
        };

        let replies = match command {
            Command::Start => vec![Reply::markdown(messages::START)],
            Command::Help => vec![Reply::markdown(messages::HELP)],
            Command::Info => vec![Reply::markdown(messages::INFO)],
            Command::Chains => vec![Reply::markdown(messages::chains(&self.registry))],
            Command::Tokens => vec![Reply::markdown(messages::tokens(&self.registry))],
            Command::Alert(args) => self.set_alert(user_id, &args).await?,
            Command::Alerts => self.list_alerts(user_id).await,
            Command::RemoveAlert(args) => self.remove_alert(user_id, &args).await?,
            Command::Webapp => vec![
                Reply::markdown(messages::webapp(self.webapp_url.as_str())),
                Reply::plain(messages::WEBAPP_BUTTON)
                    .with_button(messages::WEBAPP_BUTTON, &self.webapp_url),
            ],
            Command::Unknown => vec![Reply::plain(messages::FALLBACK)],
        };
        Ok(replies)
    }

    async fn set_alert(&self, user_id: i64, args: &[String]) -> Result<Vec<Reply>> {
        let [symbol, direction, price, ..] = args else {
            return Ok(vec![Reply::markdown(messages::ALERT_USAGE)]);
        };

        let Some(direction) = Direction::parse(direction) else {
            return Ok(vec![Reply::plain(messages::BAD_DIRECTION)]);
        };

        let threshold = match price.parse::<f64>() {
            Ok(p) if p.is_finite() && p > 0.0 => p,
            _ => return Ok(vec![Reply::plain(messages::BAD_PRICE)]),
        };

        let Some(token) = self.registry.find_tracked(symbol) else {
            return Ok(vec![Reply::plain(messages::unknown_token(symbol))]);
        };

        if self.registry.coingecko_id(token.symbol).is_none() {
            return Ok(vec![Reply::plain(messages::no_price_tracking(token.symbol))]);
        }

        let alert = PriceAlert {
            user_id,
            token_symbol: token.symbol.to_string(),
            threshold,
            direction,
            chain_id: token.chain_id,
            token_address: token.address,
        };

        let mut replies = Vec::new();
        let previous = self.store.lock().await.add(alert).await?;
        if previous.is_some() {
            replies.push(Reply::plain(messages::alert_exists(token.symbol)));
        }
        tracing::info!(user_id, symbol = token.symbol, %direction, threshold, "Alert set");

        replies.push(Reply::plain(messages::alert_set(
            token.symbol,
            direction,
            threshold,
        )));
        Ok(replies)
    }

    async fn list_alerts(&self, user_id: i64) -> Vec<Reply> {
        let alerts = self.store.lock().await.for_user(user_id);
        if alerts.is_empty() {
            return vec![Reply::plain(messages::NO_ALERTS)];
        }
        vec![Reply::markdown(messages::alert_list(&alerts, &self.registry))]
    }

    async fn remove_alert(&self, user_id: i64, args: &[String]) -> Result<Vec<Reply>> {
        let Some(symbol) = args.first() else {
            return Ok(vec![Reply::plain(messages::REMOVE_USAGE)]);
        };
        let symbol = symbol.to_uppercase();

        match self.store.lock().await.remove(user_id, &symbol).await? {
            Some(_) => {
                tracing::info!(user_id, symbol = %symbol, "Alert removed");
                Ok(vec![Reply::plain(messages::alert_removed(&symbol))])
            }
            None => Ok(vec![Reply::plain(messages::no_alert_found(&symbol))]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertStore, MemoryBackend};
    use crate::Error;
    use async_trait::async_trait;
    use std::sync::Arc;

    async fn handler() -> CommandHandler<MemoryBackend> {
        let store = AlertStore::load(MemoryBackend::new()).await.unwrap();
        CommandHandler::new(
            store.into_shared(),
            TokenRegistry::new(),
            Url::parse("https://ragekit.example").unwrap(),
        )
    }

    #[test]
    fn test_parse_strips_bot_suffix() {
        assert_eq!(Command::parse("/help@RageGuardBot"), Command::Help);
        assert_eq!(
            Command::parse("/alert@RageGuardBot PEPE above 1"),
            Command::Alert(vec!["PEPE".into(), "above".into(), "1".into()])
        );
        assert_eq!(Command::parse("hello"), Command::Unknown);
        assert_eq!(Command::parse("/moon"), Command::Unknown);
        assert_eq!(Command::parse(""), Command::Unknown);
    }

    #[tokio::test]
    async fn test_alert_then_list() {
        let handler = handler().await;

        let replies = handler.handle(Some(7), "/alert PEPE above 0.00001").await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("PEPE above $0.00001"));

        let replies = handler.handle(Some(7), "/alerts").await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].markdown);
        assert_eq!(replies[0].text.matches("*PEPE*").count(), 1);
        assert!(replies[0].text.contains("above"));
        assert!(replies[0].text.contains("$0.00001"));
        assert!(replies[0].text.contains("Chain: Ethereum"));
    }

    #[tokio::test]
    async fn test_alert_validation_order() {
        let handler = handler().await;

        let usage = handler.handle(Some(1), "/alert PEPE above").await;
        assert!(usage[0].text.contains("Usage"));

        let direction = handler.handle(Some(1), "/alert NOPE sideways -1").await;
        assert_eq!(direction[0].text, messages::BAD_DIRECTION);

        let price = handler.handle(Some(1), "/alert NOPE ABOVE -1").await;
        assert_eq!(price[0].text, messages::BAD_PRICE);

        let unknown = handler.handle(Some(1), "/alert NOPE above 1").await;
        assert!(unknown[0].text.contains("not found"));

        assert!(handler.handle(Some(1), "/alerts").await[0].text.contains("don't have"));
    }

    #[tokio::test]
    async fn test_replacing_alert_warns_first() {
        let handler = handler().await;
        handler.handle(Some(1), "/alert shib below 0.00001").await;

        let replies = handler.handle(Some(1), "/alert SHIB above 0.0001").await;
        assert_eq!(replies.len(), 2);
        assert!(replies[0].text.starts_with("⚠️"));
        assert!(replies[1].text.contains("SHIB above $0.0001"));
        assert_eq!(handler.store.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_alert() {
        let handler = handler().await;
        handler.handle(Some(1), "/alert DEGEN above 0.5").await;

        assert_eq!(
            handler.handle(Some(1), "/removealert").await[0].text,
            messages::REMOVE_USAGE
        );
        assert!(handler.handle(Some(2), "/removealert degen").await[0]
            .text
            .contains("No alert found for DEGEN"));
        assert_eq!(
            handler.handle(Some(1), "/removealert degen").await[0].text,
            messages::alert_removed("DEGEN")
        );
        assert!(handler.store.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_user_required_for_alert_commands() {
        let handler = handler().await;
        assert_eq!(
            handler.handle(None, "/alerts").await[0].text,
            messages::UNKNOWN_USER
        );
        assert_eq!(
            handler.handle(None, "/help").await[0].text,
            messages::HELP
        );
    }

    #[tokio::test]
    async fn test_webapp_sends_button() {
        let handler = handler().await;
        let replies = handler.handle(Some(1), "/webapp").await;
        assert_eq!(replies.len(), 2);
        let button = replies[1].button.as_ref().unwrap();
        assert_eq!(button.url, "https://ragekit.example/");
    }

    #[tokio::test]
    async fn test_fallback_reply() {
        let handler = handler().await;
        assert_eq!(
            handler.handle(Some(1), "gm").await[0].text,
            messages::FALLBACK
        );
    }

    struct BrokenBackend;

    #[async_trait]
    impl AlertBackend for BrokenBackend {
        async fn load(&self) -> Result<Vec<PriceAlert>> {
            Ok(Vec::new())
        }
        async fn save(&self, _alerts: &[PriceAlert]) -> Result<()> {
            Err(Error::Io(std::io::Error::other("disk full")))
        }
    }

    #[tokio::test]
    async fn test_storage_error_gets_generic_reply() {
        let store = AlertStore::load(BrokenBackend).await.unwrap().into_shared();
        let handler = CommandHandler::new(
            Arc::clone(&store),
            TokenRegistry::new(),
            Url::parse("https://ragekit.example").unwrap(),
        );

        let replies = handler.handle(Some(1), "/alert PEPE above 1").await;
        assert_eq!(replies, vec![Reply::plain(messages::HANDLER_ERROR)]);
        // The unsaved alert must not fire later
        assert!(store.lock().await.is_empty());
    }
}
