//! Batch exit orchestration
//!
//! Swaps every holding into its chain's default stablecoin, one chain group at
//! a time, one holding at a time. A failure on one holding is recorded and the
//! run moves on; nothing is rolled back or retried.

mod journal;
mod plan;
mod report;

pub use journal::ExitJournal;
pub use plan::{ChainGroup, ExitPlan, HoldingAction};
pub use report::{ExitPhase, ExitReport, ExitStatus, HoldingOutcome, Outcome};

use crate::aggregator::{SwapAggregator, SwapParams};
use crate::config::ExitConfig;
use crate::scanner::Holding;
use crate::tokens::{StablecoinTarget, TokenRegistry};
use crate::wallet::{TransactionPayload, WalletClient};
use crate::{Error, Result};
use alloy::primitives::TxHash;
use report::Progress;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

pub struct ExitOrchestrator<A, W> {
    aggregator: A,
    wallet: W,
    registry: TokenRegistry,
    config: ExitConfig,
    journal: Option<ExitJournal>,
    status: Arc<watch::Sender<ExitStatus>>,
    running: Mutex<()>,
}

impl<A: SwapAggregator, W: WalletClient> ExitOrchestrator<A, W> {
    pub fn new(aggregator: A, wallet: W, config: ExitConfig) -> Self {
        let journal = config.journal_path.as_ref().map(ExitJournal::new);
        let (status, _) = watch::channel(ExitStatus::idle());
        Self {
            aggregator,
            wallet,
            registry: TokenRegistry::new(),
            config,
            journal,
            status: Arc::new(status),
            running: Mutex::new(()),
        }
    }

    pub fn with_registry(mut self, registry: TokenRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_journal(mut self, journal: Option<ExitJournal>) -> Self {
        self.journal = journal;
        self
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Follow status updates
    pub fn subscribe(&self) -> watch::Receiver<ExitStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> ExitStatus {
        self.status.borrow().clone()
    }

    /// Swap `holdings` into stablecoins
    ///
    /// Fails only when there is nothing to do or another exit is running.
    /// Per-holding failures are reported in the returned [`ExitReport`].
    pub async fn execute(
        &self,
        holdings: &[Holding],
        cancel: &CancellationToken,
    ) -> Result<ExitReport> {
        if holdings.is_empty() {
            return Err(Error::InvalidArgument("No tokens to swap".to_string()));
        }
        let _guard = self.running.try_lock().map_err(|_| Error::ExitInProgress)?;

        let run_id = Uuid::new_v4();
        let plan = ExitPlan::build(holdings, &self.registry);
        let mut progress = Progress::new(plan.total_steps());
        let mut outcomes = Vec::with_capacity(plan.holding_count());

        info!(
            %run_id,
            holdings = plan.holding_count(),
            chains = plan.groups.len(),
            "Starting exit"
        );
        self.publish(
            ExitPhase::Running,
            format!("Exiting {} tokens", plan.holding_count()),
            &progress,
        );

        for holding in &plan.unsupported {
            warn!(
                chain_id = holding.chain_id,
                symbol = %holding.symbol,
                "No stablecoin configured for chain, skipping"
            );
            progress.advance(2);
            self.record(run_id, &mut outcomes, holding, Outcome::SkippedUnsupportedChain)
                .await;
        }

        for group in &plan.groups {
            let chain_name = self.registry.chain_name(group.chain_id);

            if let Err(e) = self.ensure_chain(group.chain_id, cancel).await {
                warn!(chain_id = group.chain_id, error = %e, "Chain switch failed, skipping group");
                for holding in &group.holdings {
                    progress.advance(2);
                    let outcome = Outcome::Failed {
                        error: e.to_string(),
                        approve_tx: None,
                    };
                    self.record(run_id, &mut outcomes, holding, outcome).await;
                }
                self.publish(
                    ExitPhase::Running,
                    format!("Could not switch to {}", chain_name),
                    &progress,
                );
                continue;
            }

            for holding in &group.holdings {
                let start = progress.done();
                let outcome = match HoldingAction::classify(holding, &group.target) {
                    HoldingAction::AlreadyTarget => Outcome::SkippedAlreadyTarget,
                    HoldingAction::Native => Outcome::SkippedNative,
                    HoldingAction::Swap => {
                        self.swap_holding(holding, &group.target, &mut progress, cancel)
                            .await
                    }
                };
                progress.finish_holding(start);
                self.publish(
                    ExitPhase::Running,
                    format!("Processed {} on {}", holding.symbol, chain_name),
                    &progress,
                );
                self.record(run_id, &mut outcomes, holding, outcome).await;
            }
        }

        let report = ExitReport {
            run_id,
            outcomes,
            steps_done: progress.done(),
            steps_total: progress.total(),
        };

        info!(
            %run_id,
            swapped = report.swapped(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Exit finished"
        );
        self.status.send_replace(ExitStatus {
            phase: ExitPhase::Complete,
            message: report.summary(),
            percent: 100,
        });
        self.schedule_reset();

        Ok(report)
    }

    /// Approve if needed, then swap; errors become `Outcome::Failed`
    async fn swap_holding(
        &self,
        holding: &Holding,
        target: &StablecoinTarget,
        progress: &mut Progress,
        cancel: &CancellationToken,
    ) -> Outcome {
        let mut approve_tx = None;
        match self
            .approve_and_swap(holding, target, progress, cancel, &mut approve_tx)
            .await
        {
            Ok(swap_tx) => Outcome::Swapped {
                approve_tx,
                swap_tx,
            },
            Err(e) => {
                warn!(
                    chain_id = holding.chain_id,
                    symbol = %holding.symbol,
                    approve_tx = ?approve_tx,
                    error = %e,
                    "Swap failed"
                );
                Outcome::Failed {
                    error: e.to_string(),
                    approve_tx,
                }
            }
        }
    }

    /// Advances one step after the approval and one after the swap.
    /// A mined approval is stored in `approve_tx` even if the swap then fails.
    async fn approve_and_swap(
        &self,
        holding: &Holding,
        target: &StablecoinTarget,
        progress: &mut Progress,
        cancel: &CancellationToken,
        approve_tx: &mut Option<TxHash>,
    ) -> Result<TxHash> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let owner = self.wallet.address();
        let allowance = self
            .aggregator
            .check_allowance(holding.chain_id, holding.address, owner)
            .await?;

        if allowance < holding.raw_balance {
            self.publish(
                ExitPhase::Running,
                format!("Approving {}...", holding.symbol),
                progress,
            );
            let approval = self
                .aggregator
                .get_approve_transaction(holding.chain_id, holding.address, Some(holding.raw_balance))
                .await?;
            let hash = self
                .wallet
                .send_transaction(TransactionPayload::try_from(&approval)?)
                .await?;
            info!(symbol = %holding.symbol, tx = %hash, "Approval sent");
            self.wait_for_receipt(hash, cancel).await?;
            *approve_tx = Some(hash);
        }
        progress.advance(1);

        self.publish(
            ExitPhase::Running,
            format!("Swapping {} to {}...", holding.symbol, target.symbol),
            progress,
        );
        let params = SwapParams {
            chain_id: holding.chain_id,
            src: holding.address,
            dst: target.address,
            amount: holding.raw_balance,
            from: owner,
            slippage: self.config.slippage_percent,
            disable_estimate: false,
        };
        let swap = self.aggregator.get_swap_transaction(&params).await?;
        let hash = self
            .wallet
            .send_transaction(TransactionPayload::try_from(&swap.tx)?)
            .await?;
        info!(symbol = %holding.symbol, tx = %hash, "Swap sent");
        self.wait_for_receipt(hash, cancel).await?;
        progress.advance(1);

        Ok(hash)
    }

    /// Switch the wallet to `chain_id` and wait until it reports that chain
    async fn ensure_chain(&self, chain_id: u64, cancel: &CancellationToken) -> Result<()> {
        if self.wallet.chain_id().await? == chain_id {
            return Ok(());
        }
        self.wallet.switch_chain(chain_id).await?;

        let wallet = &self.wallet;
        poll_until(
            cancel,
            self.config.chain_switch_timeout(),
            self.config.poll_interval(),
            &format!("switch to chain {}", chain_id),
            move || async move { Ok::<_, Error>((wallet.chain_id().await? == chain_id).then_some(())) },
        )
        .await
    }

    /// Wait for a mined receipt; a revert is an error
    async fn wait_for_receipt(&self, hash: TxHash, cancel: &CancellationToken) -> Result<()> {
        let wallet = &self.wallet;
        poll_until(
            cancel,
            self.config.receipt_timeout(),
            self.config.poll_interval(),
            &format!("receipt for {}", hash),
            move || async move {
                wallet
                    .transaction_status(hash)
                    .await
                    .and_then(|status| match status {
                        Some(true) => Ok(Some(())),
                        Some(false) => Err(Error::Wallet(format!("Transaction {} reverted", hash))),
                        None => Ok(None),
                    })
            },
        )
        .await
    }

    fn publish(&self, phase: ExitPhase, message: String, progress: &Progress) {
        self.status.send_replace(ExitStatus {
            phase,
            message,
            percent: progress.percent(),
        });
    }

    async fn record(
        &self,
        run_id: Uuid,
        outcomes: &mut Vec<HoldingOutcome>,
        holding: &Holding,
        outcome: Outcome,
    ) {
        let record = HoldingOutcome {
            chain_id: holding.chain_id,
            symbol: holding.symbol.clone(),
            token: holding.address,
            outcome,
        };
        if let Some(journal) = &self.journal {
            journal.record(run_id, &record).await;
        }
        outcomes.push(record);
    }

    /// Return to idle after the reset delay unless a new run has started
    fn schedule_reset(&self) {
        let status = Arc::clone(&self.status);
        let delay = self.config.reset_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            status.send_if_modified(|current| {
                if current.phase == ExitPhase::Complete {
                    *current = ExitStatus::idle();
                    true
                } else {
                    false
                }
            });
        });
    }
}

/// Poll `check` every `interval` until it yields a value, `timeout` elapses,
/// or `cancel` fires
async fn poll_until<T, F, Fut>(
    cancel: &CancellationToken,
    timeout: Duration,
    interval: Duration,
    what: &str,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let wait = async {
        loop {
            if let Some(value) = check().await? {
                return Ok::<T, Error>(value);
            }
            tokio::time::sleep(interval).await;
        }
    };

    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled),
        res = tokio::time::timeout(timeout, wait) => {
            res.map_err(|_| Error::Timeout(what.to_string()))?
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{ApproveTransaction, SwapResponse, TxPayload};
    use crate::tokens::{addresses, chains, ChainInfo, TokenInfo, NATIVE_ASSET};
    use crate::wallet::DryRunWallet;
    use alloy::primitives::{address, Address, Bytes, U256};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio_test::{assert_err, assert_ok};

    const PEPE: Address = address!("0000000000000000000000000000000000000aaa");
    const USDC: Address = address!("0000000000000000000000000000000000000bbb");
    const ROUTER: Address = address!("1111111254eeb25477b68fb85ed929f73a960582");
    const OWNER: Address = address!("4242424242424242424242424242424242424242");

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Allowance(Address),
        Approve(Address, Option<U256>),
        Swap(Address, Address, U256, f64),
    }

    /// Records calls; tokens in `failing` error on allowance
    #[derive(Default)]
    struct RecordingAggregator {
        allowances: HashMap<Address, U256>,
        failing: Vec<Address>,
        calls: std::sync::Mutex<Vec<Call>>,
    }

    impl RecordingAggregator {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn push(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl SwapAggregator for RecordingAggregator {
        async fn get_swap_quote(
            &self,
            _chain_id: u64,
            _src: Address,
            _dst: Address,
            _amount: U256,
            _from: Address,
        ) -> Result<SwapResponse> {
            unreachable!("exit never quotes")
        }

        async fn get_swap_transaction(&self, params: &SwapParams) -> Result<SwapResponse> {
            self.push(Call::Swap(params.src, params.dst, params.amount, params.slippage));
            Ok(SwapResponse {
                dst_amount: Some("990".to_string()),
                tx: TxPayload {
                    from: Some(params.from),
                    to: ROUTER,
                    data: Bytes::from(vec![0x12, 0xaa]),
                    value: "0".to_string(),
                    gas: Some(200_000),
                    gas_price: None,
                },
            })
        }

        async fn check_allowance(
            &self,
            _chain_id: u64,
            token: Address,
            _wallet: Address,
        ) -> Result<U256> {
            self.push(Call::Allowance(token));
            if self.failing.contains(&token) {
                return Err(Error::Upstream {
                    status: 500,
                    body: "internal".to_string(),
                });
            }
            Ok(self.allowances.get(&token).copied().unwrap_or(U256::ZERO))
        }

        async fn get_approve_transaction(
            &self,
            _chain_id: u64,
            token: Address,
            amount: Option<U256>,
        ) -> Result<ApproveTransaction> {
            self.push(Call::Approve(token, amount));
            Ok(ApproveTransaction {
                to: token,
                data: Bytes::from(vec![0x09, 0x5e, 0xa7, 0xb3]),
                value: "0".to_string(),
                gas_price: None,
            })
        }
    }

    /// Wallet that never confirms a chain switch
    struct StuckWallet;

    #[async_trait]
    impl WalletClient for StuckWallet {
        fn address(&self) -> Address {
            OWNER
        }
        async fn chain_id(&self) -> Result<u64> {
            Ok(chains::ETHEREUM)
        }
        async fn switch_chain(&self, _chain_id: u64) -> Result<()> {
            Ok(())
        }
        async fn send_transaction(&self, _tx: TransactionPayload) -> Result<TxHash> {
            unreachable!("no transaction after a failed switch")
        }
        async fn transaction_status(&self, _hash: TxHash) -> Result<Option<bool>> {
            Ok(None)
        }
    }

    /// Wallet on which approvals mine and every router call reverts
    struct RevertingWallet;

    const APPROVE_HASH: TxHash = TxHash::repeat_byte(0xaa);
    const SWAP_HASH: TxHash = TxHash::repeat_byte(0xee);

    #[async_trait]
    impl WalletClient for RevertingWallet {
        fn address(&self) -> Address {
            OWNER
        }
        async fn chain_id(&self) -> Result<u64> {
            Ok(chains::ETHEREUM)
        }
        async fn switch_chain(&self, _chain_id: u64) -> Result<()> {
            Ok(())
        }
        async fn send_transaction(&self, tx: TransactionPayload) -> Result<TxHash> {
            Ok(if tx.to == ROUTER { SWAP_HASH } else { APPROVE_HASH })
        }
        async fn transaction_status(&self, hash: TxHash) -> Result<Option<bool>> {
            Ok(Some(hash != SWAP_HASH))
        }
    }

    fn test_config() -> ExitConfig {
        ExitConfig {
            chain_switch_timeout_ms: 50,
            receipt_timeout_ms: 50,
            poll_interval_ms: 5,
            reset_delay_ms: 10,
            journal_path: None,
            ..ExitConfig::default()
        }
    }

    fn test_registry() -> TokenRegistry {
        TokenRegistry::empty()
            .with_chain(ChainInfo {
                id: chains::ETHEREUM,
                name: "Ethereum",
                native_symbol: "ETH",
                native_decimals: 18,
                aggregator_id: Some(1),
            })
            .with_chain(ChainInfo {
                id: chains::BASE,
                name: "Base",
                native_symbol: "ETH",
                native_decimals: 18,
                aggregator_id: Some(8453),
            })
            .with_stablecoin(TokenInfo::new(chains::ETHEREUM, USDC, "USDC", 6))
            .with_stablecoin(TokenInfo::new(chains::BASE, addresses::USDC_BASE, "USDC", 6))
    }

    fn holding(chain_id: u64, address: Address, symbol: &str, raw: u64) -> Holding {
        Holding {
            chain_id,
            chain_name: String::new(),
            address,
            symbol: symbol.to_string(),
            decimals: 18,
            balance: raw.to_string(),
            raw_balance: U256::from(raw),
        }
    }

    fn orchestrator<W: WalletClient>(
        aggregator: RecordingAggregator,
        wallet: W,
    ) -> ExitOrchestrator<RecordingAggregator, W> {
        ExitOrchestrator::new(aggregator, wallet, test_config()).with_registry(test_registry())
    }

    #[tokio::test]
    async fn test_approves_then_swaps_when_allowance_is_zero() {
        let exit = orchestrator(
            RecordingAggregator::default(),
            DryRunWallet::new(OWNER, chains::ETHEREUM),
        );
        let holdings = vec![holding(chains::ETHEREUM, PEPE, "PEPE", 1000)];

        let report = assert_ok!(exit.execute(&holdings, &CancellationToken::new()).await);

        assert_eq!(
            exit.aggregator.calls(),
            vec![
                Call::Allowance(PEPE),
                Call::Approve(PEPE, Some(U256::from(1000u64))),
                Call::Swap(PEPE, USDC, U256::from(1000u64), 3.0),
            ]
        );
        let sent = exit.wallet().sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].payload.to, PEPE);
        assert_eq!(sent[1].payload.to, ROUTER);

        assert_eq!(report.swapped(), 1);
        assert_eq!(report.steps_done, 2);
        assert_eq!(report.steps_total, 2);
        assert_eq!(exit.status().percent, 100);
        assert_eq!(exit.status().phase, ExitPhase::Complete);
    }

    #[tokio::test]
    async fn test_sufficient_allowance_skips_approval() {
        let mut aggregator = RecordingAggregator::default();
        aggregator.allowances.insert(PEPE, U256::from(5000u64));
        let exit = orchestrator(aggregator, DryRunWallet::new(OWNER, chains::ETHEREUM));

        let holdings = vec![holding(chains::ETHEREUM, PEPE, "PEPE", 1000)];
        let report = assert_ok!(exit.execute(&holdings, &CancellationToken::new()).await);

        assert_eq!(exit.aggregator.calls().len(), 2);
        assert!(matches!(
            report.outcomes[0].outcome,
            Outcome::Swapped { approve_tx: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_target_and_native_are_skipped_without_calls() {
        let exit = orchestrator(
            RecordingAggregator::default(),
            DryRunWallet::new(OWNER, chains::ETHEREUM),
        );
        let holdings = vec![
            holding(chains::ETHEREUM, USDC, "USDC", 10),
            holding(chains::ETHEREUM, NATIVE_ASSET, "ETH", 10),
        ];

        let report = assert_ok!(exit.execute(&holdings, &CancellationToken::new()).await);

        assert!(exit.aggregator.calls().is_empty());
        assert!(exit.wallet().sent().await.is_empty());
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.steps_done, 4);
    }

    #[tokio::test]
    async fn test_failures_still_count_two_steps_each() {
        let mut aggregator = RecordingAggregator::default();
        aggregator.failing.push(PEPE);
        let exit = orchestrator(aggregator, DryRunWallet::new(OWNER, chains::ETHEREUM));

        let holdings = vec![
            holding(chains::ETHEREUM, PEPE, "PEPE", 1000),
            holding(chains::BASE, addresses::DEGEN_BASE, "DEGEN", 7),
            holding(chains::BASE, NATIVE_ASSET, "ETH", 7),
            holding(56, Address::repeat_byte(0x56), "CAKE", 7),
        ];

        let report = assert_ok!(exit.execute(&holdings, &CancellationToken::new()).await);

        assert_eq!(report.steps_total, 8);
        assert_eq!(report.steps_done, 8);
        assert_eq!(report.swapped(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(exit.status().percent, 100);

        // DEGEN was swapped on Base after the switch
        let sent = exit.wallet().sent().await;
        assert!(sent.iter().all(|tx| tx.chain_id == chains::BASE));
    }

    #[tokio::test]
    async fn test_reverted_swap_is_a_failure() {
        let mut aggregator = RecordingAggregator::default();
        aggregator.allowances.insert(PEPE, U256::MAX);
        let exit = orchestrator(aggregator, RevertingWallet);

        let holdings = vec![holding(chains::ETHEREUM, PEPE, "PEPE", 1000)];
        let report = assert_ok!(exit.execute(&holdings, &CancellationToken::new()).await);

        assert_eq!(report.failed(), 1);
        assert_eq!(report.steps_done, 2);
        assert!(matches!(
            report.outcomes[0].outcome,
            Outcome::Failed { approve_tx: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_mined_approval_is_kept_when_swap_fails() {
        let exit = orchestrator(RecordingAggregator::default(), RevertingWallet);

        let holdings = vec![holding(chains::ETHEREUM, PEPE, "PEPE", 1000)];
        let report = assert_ok!(exit.execute(&holdings, &CancellationToken::new()).await);

        match &report.outcomes[0].outcome {
            Outcome::Failed { error, approve_tx } => {
                assert!(error.contains("reverted"));
                assert_eq!(*approve_tx, Some(APPROVE_HASH));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(report.steps_done, 2);
    }

    #[tokio::test]
    async fn test_unconfirmed_chain_switch_fails_group() {
        let exit = orchestrator(RecordingAggregator::default(), StuckWallet);
        let holdings = vec![
            holding(chains::BASE, addresses::DEGEN_BASE, "DEGEN", 1),
            holding(chains::BASE, addresses::BRETT_BASE, "BRETT", 1),
        ];

        let report = assert_ok!(exit.execute(&holdings, &CancellationToken::new()).await);

        assert!(exit.aggregator.calls().is_empty());
        assert_eq!(report.failed(), 2);
        assert_eq!(report.steps_done, 4);
        assert!(matches!(
            &report.outcomes[0].outcome,
            Outcome::Failed { error, .. } if error.contains("Timed out")
        ));
    }

    #[tokio::test]
    async fn test_cancelled_run_fails_remaining_swaps() {
        let exit = orchestrator(
            RecordingAggregator::default(),
            DryRunWallet::new(OWNER, chains::ETHEREUM),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let holdings = vec![holding(chains::ETHEREUM, PEPE, "PEPE", 1000)];
        let report = assert_ok!(exit.execute(&holdings, &cancel).await);

        assert!(exit.aggregator.calls().is_empty());
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let exit = orchestrator(
            RecordingAggregator::default(),
            DryRunWallet::new(OWNER, chains::ETHEREUM),
        );

        let err = assert_err!(exit.execute(&[], &CancellationToken::new()).await);
        assert!(err.to_string().contains("No tokens to swap"));
        assert!(exit.aggregator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_exit_is_rejected() {
        let exit = orchestrator(
            RecordingAggregator::default(),
            DryRunWallet::new(OWNER, chains::ETHEREUM),
        );
        let _held = exit.running.lock().await;

        let holdings = vec![holding(chains::ETHEREUM, PEPE, "PEPE", 1000)];
        let err = assert_err!(exit.execute(&holdings, &CancellationToken::new()).await);
        assert!(matches!(err, Error::ExitInProgress));
    }

    #[tokio::test]
    async fn test_status_resets_to_idle() {
        let exit = orchestrator(
            RecordingAggregator::default(),
            DryRunWallet::new(OWNER, chains::ETHEREUM),
        );
        let mut status = exit.subscribe();

        let holdings = vec![holding(chains::ETHEREUM, NATIVE_ASSET, "ETH", 1)];
        assert_ok!(exit.execute(&holdings, &CancellationToken::new()).await);
        assert_eq!(exit.status().phase, ExitPhase::Complete);

        tokio::time::timeout(
            Duration::from_secs(1),
            status.wait_for(|s| s.phase == ExitPhase::Idle),
        )
        .await
        .unwrap()
        .unwrap();
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let result: Result<()> = poll_until(
            &CancellationToken::new(),
            Duration::from_millis(20),
            Duration::from_millis(5),
            "never",
            || async { Ok(None) },
        )
        .await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }
}
