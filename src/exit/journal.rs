//! Exit journal
//!
//! Appends one JSON line per holding outcome for later inspection.

use super::report::{HoldingOutcome, Outcome};
use alloy::primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Entry in the exit journal
#[derive(Debug, Serialize)]
struct JournalEntry<'a> {
    timestamp: DateTime<Utc>,
    run_id: Uuid,
    chain_id: u64,
    symbol: &'a str,
    token: Address,
    outcome: &'static str,
    error: Option<&'a str>,
    approve_tx: Option<TxHash>,
    swap_tx: Option<TxHash>,
}

impl<'a> JournalEntry<'a> {
    fn new(run_id: Uuid, record: &'a HoldingOutcome) -> Self {
        let (outcome, error, approve_tx, swap_tx) = match &record.outcome {
            Outcome::Swapped {
                approve_tx,
                swap_tx,
            } => ("swapped", None, *approve_tx, Some(*swap_tx)),
            Outcome::SkippedAlreadyTarget => ("skipped_already_target", None, None, None),
            Outcome::SkippedNative => ("skipped_native", None, None, None),
            Outcome::SkippedUnsupportedChain => ("skipped_unsupported_chain", None, None, None),
            Outcome::Failed { error, approve_tx } => {
                ("failed", Some(error.as_str()), *approve_tx, None)
            }
        };

        Self {
            timestamp: Utc::now(),
            run_id,
            chain_id: record.chain_id,
            symbol: &record.symbol,
            token: record.token,
            outcome,
            error,
            approve_tx,
            swap_tx,
        }
    }
}

/// Writer for journal entries
struct JournalWriter {
    path: PathBuf,
}

impl JournalWriter {
    fn write(&self, entry: &JournalEntry<'_>) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}

/// Append-only JSONL record of exit outcomes
#[derive(Clone)]
pub struct ExitJournal {
    writer: Arc<Mutex<JournalWriter>>,
}

impl ExitJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(JournalWriter { path: path.into() })),
        }
    }

    /// Append one outcome; failures are logged, never returned
    pub async fn record(&self, run_id: Uuid, outcome: &HoldingOutcome) {
        let entry = JournalEntry::new(run_id, outcome);
        let writer = self.writer.lock().await;
        if let Err(e) = writer.write(&entry) {
            tracing::warn!(path = %writer.path.display(), error = %e, "Failed to write exit journal");
        }
    }
}
