//! Exit progress, status, and final report

use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitPhase {
    Idle,
    Running,
    Complete,
}

/// Snapshot published to status subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitStatus {
    pub phase: ExitPhase,
    pub message: String,
    pub percent: u8,
}

impl ExitStatus {
    pub fn idle() -> Self {
        Self {
            phase: ExitPhase::Idle,
            message: String::new(),
            percent: 0,
        }
    }
}

impl Default for ExitStatus {
    fn default() -> Self {
        Self::idle()
    }
}

/// Step counter over `holdings * 2` steps
#[derive(Debug, Clone, Copy)]
pub(crate) struct Progress {
    done: usize,
    total: usize,
}

impl Progress {
    pub(crate) fn new(total: usize) -> Self {
        Self { done: 0, total }
    }

    pub(crate) fn advance(&mut self, steps: usize) {
        self.done = (self.done + steps).min(self.total);
    }

    /// Mark a holding that started at `start` as fully counted
    pub(crate) fn finish_holding(&mut self, start: usize) {
        self.done = self.done.max((start + 2).min(self.total));
    }

    pub(crate) fn done(&self) -> usize {
        self.done
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.done * 100 / self.total) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Swapped {
        approve_tx: Option<TxHash>,
        swap_tx: TxHash,
    },
    SkippedAlreadyTarget,
    SkippedNative,
    SkippedUnsupportedChain,
    /// `approve_tx` is set when an approval was mined before the failure
    Failed {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        approve_tx: Option<TxHash>,
    },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::SkippedUnsupportedChain)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HoldingOutcome {
    pub chain_id: u64,
    pub symbol: String,
    pub token: Address,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExitReport {
    pub run_id: Uuid,
    pub outcomes: Vec<HoldingOutcome>,
    pub steps_done: usize,
    pub steps_total: usize,
}

impl ExitReport {
    pub fn swapped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Swapped { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.outcome,
                    Outcome::SkippedAlreadyTarget | Outcome::SkippedNative
                )
            })
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_failure()).count()
    }

    pub fn summary(&self) -> String {
        let failed = self.failed();
        if failed == 0 {
            format!(
                "Exit complete: {} swapped, {} skipped",
                self.swapped(),
                self.skipped()
            )
        } else {
            format!(
                "Exit complete: {} swapped, {} skipped, {} failed",
                self.swapped(),
                self.skipped(),
                failed
            )
        }
    }
}
