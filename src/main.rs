//! RageKit CLI
//!
//! Scan balances, quote and execute exits, check price health, and run the
//! RageGuard bot.

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use ragekit::aggregator::{OneInchClient, SwapAggregator};
use ragekit::alerts::{AlertStore, JsonFileBackend};
use ragekit::exit::ExitPhase;
use ragekit::prices::{HealthTier, PriceHealthClient};
use ragekit::scanner::RpcBalanceReader;
use ragekit::tokens::{chains, registry};
use ragekit::wallet::{DryRunWallet, RpcWallet, WalletClient};
use ragekit::{
    BalanceScanner, BotRunner, Config, Error, ExitOrchestrator, Holding, Result, RpcConfig,
    Secrets,
};
use std::path::PathBuf;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ragekit")]
#[command(about = "Exit degen positions into stablecoins, and get warned before you need to")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an account for risk-token holdings on every chain
    Scan {
        /// Account address
        #[arg(short, long)]
        account: String,
    },

    /// Get a swap quote from the aggregator
    Quote {
        /// Chain id or name (ethereum, base, arbitrum, optimism, polygon)
        #[arg(long, default_value = "ethereum")]
        chain: String,

        /// Source token address
        #[arg(long)]
        src: String,

        /// Destination token address
        #[arg(long)]
        dst: String,

        /// Amount in the source token's smallest unit
        #[arg(long)]
        amount: String,

        /// Account the swap would come from (defaults to zero address)
        #[arg(long)]
        from: Option<String>,
    },

    /// Swap every holding into its chain's default stablecoin
    Exit {
        /// Account address
        #[arg(short, long)]
        account: String,

        /// Record transactions instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show 24h price health for a token
    Health {
        /// Chain id or name
        #[arg(long, default_value = "ethereum")]
        chain: String,

        /// Token address
        #[arg(long)]
        token: String,
    },

    /// List persisted price alerts
    Alerts {
        /// Only this Telegram user's alerts
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// Run the RageGuard Telegram bot
    Bot,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Scan { account } => run_scan(&account).await?,
        Commands::Quote {
            chain,
            src,
            dst,
            amount,
            from,
        } => run_quote(&config, &chain, &src, &dst, &amount, from.as_deref()).await?,
        Commands::Exit { account, dry_run } => run_exit(&config, &account, dry_run).await?,
        Commands::Health { chain, token } => run_health(&config, &chain, &token).await?,
        Commands::Alerts { user } => run_alerts(&config, user).await?,
        Commands::Bot => BotRunner::new(config, Secrets::from_env()?).run().await?,
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn parse_address(label: &str, value: &str) -> Result<Address> {
    Address::from_str(value)
        .map_err(|e| Error::InvalidArgument(format!("Invalid {} address: {}", label, e)))
}

fn parse_chain(value: &str) -> Result<u64> {
    registry()
        .resolve_chain(value)
        .map(|c| c.id)
        .ok_or_else(|| Error::InvalidArgument(format!("Unknown chain: {}", value)))
}

async fn scan(account: Address) -> Vec<Holding> {
    let reader = RpcBalanceReader::new(RpcConfig::from_env());
    BalanceScanner::new(reader, registry().clone())
        .scan(account)
        .await
}

fn print_holdings(holdings: &[Holding]) {
    if holdings.is_empty() {
        println!("No holdings found");
        return;
    }
    for h in holdings {
        println!(
            "{:<10} {:<8} {:>24}  {}",
            h.chain_name, h.symbol, h.balance, h.address
        );
    }
}

async fn run_scan(account: &str) -> Result<()> {
    let account = parse_address("account", account)?;
    let holdings = scan(account).await;
    print_holdings(&holdings);
    Ok(())
}

async fn run_quote(
    config: &Config,
    chain: &str,
    src: &str,
    dst: &str,
    amount: &str,
    from: Option<&str>,
) -> Result<()> {
    let chain_id = parse_chain(chain)?;
    let src = parse_address("source token", src)?;
    let dst = parse_address("destination token", dst)?;
    let from = from
        .map(|f| parse_address("from", f))
        .transpose()?
        .unwrap_or(Address::ZERO);
    let amount = U256::from_str(amount)
        .map_err(|e| Error::InvalidArgument(format!("Invalid amount: {}", e)))?;

    let secrets = Secrets::from_env()?;
    let client = OneInchClient::new(&config.aggregator.swap_base_url, secrets.aggregator_api_key);

    tracing::info!(chain_id, %src, %dst, %amount, "Requesting quote");
    let quote = client.get_swap_quote(chain_id, src, dst, amount, from).await?;

    println!("{}", serde_json::to_string_pretty(&quote)?);
    Ok(())
}

async fn run_exit(config: &Config, account: &str, dry_run: bool) -> Result<()> {
    let account = parse_address("account", account)?;
    let holdings = scan(account).await;
    print_holdings(&holdings);

    let secrets = Secrets::from_env()?;
    let aggregator =
        OneInchClient::new(&config.aggregator.swap_base_url, secrets.aggregator_api_key);

    if dry_run {
        tracing::info!("Dry run - transactions are recorded, not sent");
        let wallet = DryRunWallet::new(account, chains::ETHEREUM);
        execute_exit(ExitOrchestrator::new(aggregator, wallet, config.exit.clone()), &holdings)
            .await
    } else {
        let wallet = RpcWallet::new(RpcConfig::from_env(), account, chains::ETHEREUM);
        execute_exit(ExitOrchestrator::new(aggregator, wallet, config.exit.clone()), &holdings)
            .await
    }
}

async fn execute_exit<W: WalletClient>(
    orchestrator: ExitOrchestrator<OneInchClient, W>,
    holdings: &[Holding],
) -> Result<()> {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Cancelling exit");
            trigger.cancel();
        }
    });

    let mut status = orchestrator.subscribe();
    let printer = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            if current.phase == ExitPhase::Idle {
                continue;
            }
            println!("[{:>3}%] {}", current.percent, current.message);
            if current.phase == ExitPhase::Complete {
                break;
            }
        }
    });

    let report = orchestrator.execute(holdings, &cancel).await;
    // Closes the status channel if the run never started
    drop(orchestrator);
    let _ = printer.await;
    let report = report?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_health(config: &Config, chain: &str, token: &str) -> Result<()> {
    let chain_id = parse_chain(chain)?;
    let token = parse_address("token", token)?;
    let secrets = Secrets::from_env()?;

    let client = PriceHealthClient::new(&config.aggregator.price_base_url, secrets.aggregator_api_key);
    let snapshot = client.snapshot(chain_id, token).await;
    let tier = HealthTier::classify(snapshot.as_ref().and_then(|s| s.change_24h()));

    match &snapshot {
        Some(s) => println!(
            "{} {} | price ${} | 24h {}",
            tier.emoji(),
            tier.label(),
            s.price,
            s.price_change_24h.as_deref().unwrap_or("n/a")
        ),
        None => println!("{} {} | no price data", tier.emoji(), tier.label()),
    }
    Ok(())
}

async fn run_alerts(config: &Config, user: Option<i64>) -> Result<()> {
    let store = AlertStore::load(JsonFileBackend::new(&config.alerts.store_path)).await?;
    let alerts = match user {
        Some(id) => store.for_user(id),
        None => store.all(),
    };

    if alerts.is_empty() {
        println!("No alerts");
        return Ok(());
    }
    for a in alerts {
        println!(
            "{:>12}  {:<6} {:<5} ${:<14} {}",
            a.user_id,
            a.token_symbol,
            a.direction.as_str(),
            a.threshold,
            registry().chain_name(a.chain_id)
        );
    }
    Ok(())
}
