//! Types for the batch sender

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Number of calls in one batch run
pub const CALL_COUNT: u64 = 15;

/// Stage of a single call within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStage {
    /// Submitted, hash known, confirmation pending
    Sent,
    /// Confirmed to depth 1, receipt attached
    Confirmed,
    /// Terminal failure (submission or confirmation wait)
    Failed,
}

/// Receipt summary attached to a confirmed call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptSummary {
    pub status: bool,
    pub block_number: u64,
    pub gas_used: u64,
}

/// Decoded Ping event from a confirmed receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingEvent {
    pub sender: String,
    pub index: String,
    pub value: String,
}

/// One entry per attempted call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    /// Call index, 1..=CALL_COUNT, unique per run
    pub index: u64,

    pub stage: CallStage,

    /// Transaction hash, present once the call was submitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,

    /// Present only when stage is Confirmed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ReceiptSummary>,

    /// Present only when stage is Confirmed and a receipt log decoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<PingEvent>,

    /// Present only when stage is Failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub submitted_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl CallRecord {
    /// Record created on submission success, before confirmation
    pub fn sent(index: u64, tx_hash: String) -> Self {
        Self {
            index,
            stage: CallStage::Sent,
            tx_hash: Some(tx_hash),
            receipt: None,
            event: None,
            error: None,
            submitted_at: Some(Utc::now()),
            resolved_at: None,
        }
    }

    /// Record created directly in Failed, when no hash was obtained
    pub fn failed(index: u64, error: String) -> Self {
        Self {
            index,
            stage: CallStage::Failed,
            tx_hash: None,
            receipt: None,
            event: None,
            error: Some(error),
            submitted_at: None,
            resolved_at: Some(Utc::now()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.stage, CallStage::Confirmed | CallStage::Failed)
    }
}

/// Snapshot of one batch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    pub running: bool,
    pub records: Vec<CallRecord>,
}

impl RunState {
    pub fn confirmed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.stage == CallStage::Confirmed)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.stage == CallStage::Failed)
            .count()
    }
}

/// Run log shared between the single run task and HTTP readers.
///
/// Only the run task mutates it; readers clone snapshots and must tolerate
/// mid-run states (a Sent record not yet resolved).
#[derive(Clone, Default)]
pub struct BatchLog {
    inner: Arc<RwLock<RunState>>,
}

impl BatchLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the log for a new run, clearing the previous one.
    ///
    /// Returns false if a run is already in progress.
    pub async fn try_begin(&self) -> bool {
        let mut state = self.inner.write().await;
        if state.running {
            return false;
        }
        state.running = true;
        state.records.clear();
        true
    }

    pub async fn push_sent(&self, index: u64, tx_hash: &str) {
        let mut state = self.inner.write().await;
        state.records.push(CallRecord::sent(index, tx_hash.to_string()));
    }

    pub async fn push_failed(&self, index: u64, error: String) {
        let mut state = self.inner.write().await;
        state.records.push(CallRecord::failed(index, error));
    }

    /// Resolve the Sent record with this hash to Confirmed.
    pub async fn confirm(&self, tx_hash: &str, receipt: ReceiptSummary, event: Option<PingEvent>) {
        let mut state = self.inner.write().await;
        if let Some(record) = state
            .records
            .iter_mut()
            .find(|r| r.tx_hash.as_deref() == Some(tx_hash))
        {
            record.stage = CallStage::Confirmed;
            record.receipt = Some(receipt);
            record.event = event;
            record.resolved_at = Some(Utc::now());
        }
    }

    /// Resolve the Sent record with this hash to Failed, keeping the hash.
    pub async fn fail_sent(&self, tx_hash: &str, error: String) {
        let mut state = self.inner.write().await;
        if let Some(record) = state
            .records
            .iter_mut()
            .find(|r| r.tx_hash.as_deref() == Some(tx_hash))
        {
            record.stage = CallStage::Failed;
            record.error = Some(error);
            record.resolved_at = Some(Utc::now());
        }
    }

    /// Clear the running flag and return the final record sequence.
    pub async fn finish(&self) -> Vec<CallRecord> {
        let mut state = self.inner.write().await;
        state.running = false;
        state.records.clone()
    }

    pub async fn snapshot(&self) -> RunState {
        self.inner.read().await.clone()
    }

    pub async fn is_running(&self) -> bool {
        self.inner.read().await.running
    }
}

/// Batch sender statistics across runs
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStats {
    pub runs_completed: u64,
    pub calls_confirmed: u64,
    pub calls_failed: u64,
    pub last_run_at: Option<DateTime<Utc>>,
}

impl BatchStats {
    /// Fold a completed run into the counters
    pub fn record_run(&mut self, records: &[CallRecord]) {
        self.runs_completed += 1;
        self.calls_confirmed += records
            .iter()
            .filter(|r| r.stage == CallStage::Confirmed)
            .count() as u64;
        self.calls_failed += records
            .iter()
            .filter(|r| r.stage == CallStage::Failed)
            .count() as u64;
        self.last_run_at = Some(Utc::now());
    }
}
