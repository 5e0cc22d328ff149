//! Batch submitter implementation
//!
//! Submits calls for indices 1..=15 strictly sequentially: the call for
//! index i+1 is not issued until index i has resolved (confirmed or failed).
//! A failure at one index never aborts the run; the loop always proceeds,
//! since the calls are logically independent.

use std::sync::Arc;

use alloy::primitives::U256;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    client::{try_decode_ping, PingChain},
    types::{BatchLog, BatchStats, CallRecord, CallStage, ReceiptSummary, CALL_COUNT},
};

/// Batch submitter driving one run at a time against the chain capability
pub struct BatchSubmitter {
    chain: Arc<dyn PingChain>,
    log: BatchLog,
    stats: Arc<RwLock<BatchStats>>,
}

impl BatchSubmitter {
    /// Create a new batch submitter
    pub fn new(chain: Arc<dyn PingChain>, log: BatchLog, stats: Arc<RwLock<BatchStats>>) -> Self {
        Self { chain, log, stats }
    }

    /// Run log, for read-only snapshots by the presentation layer
    pub fn log(&self) -> &BatchLog {
        &self.log
    }

    /// Run a batch inline if none is in progress.
    ///
    /// Returns the final record sequence, or None if a run was already
    /// in progress.
    pub async fn try_run(&self, value_per_call: U256) -> Option<Vec<CallRecord>> {
        if !self.log.try_begin().await {
            return None;
        }
        Some(self.run_batch(value_per_call).await)
    }

    /// Start a run on a background task if none is in progress.
    ///
    /// Returns false if a run was already in progress.
    pub async fn spawn_run(self: &Arc<Self>, value_per_call: U256) -> bool {
        if !self.log.try_begin().await {
            return false;
        }
        let submitter = Arc::clone(self);
        tokio::spawn(async move {
            submitter.run_batch(value_per_call).await;
        });
        true
    }

    /// Execute one claimed run: all indices, fail-soft, then release the log.
    async fn run_batch(&self, value_per_call: U256) -> Vec<CallRecord> {
        info!(
            value_per_call = %value_per_call,
            calls = CALL_COUNT,
            "Starting batch run"
        );

        for index in 1..=CALL_COUNT {
            self.submit_one(index, value_per_call).await;
        }

        let records = self.log.finish().await;

        let mut stats = self.stats.write().await;
        stats.record_run(&records);
        drop(stats);

        let confirmed = records
            .iter()
            .filter(|r| r.stage == CallStage::Confirmed)
            .count();
        info!(
            confirmed = confirmed,
            failed = records.len() - confirmed,
            "Batch run complete"
        );

        records
    }

    /// Submit one call and wait for its outcome.
    ///
    /// Errors are contained here: the record is resolved to failed and the
    /// caller moves on to the next index.
    async fn submit_one(&self, index: u64, value: U256) {
        let sent = match self.chain.submit_ping(index, value).await {
            Ok(sent) => sent,
            Err(e) => {
                warn!(index = index, error = %e, "Call failed before a hash was obtained");
                self.log.push_failed(index, e.to_string()).await;
                return;
            }
        };

        let tx_hash = format!("0x{}", hex::encode(sent.tx_hash.as_slice()));
        // Observable as "sent" before the confirmation wait begins
        self.log.push_sent(index, &tx_hash).await;

        match self.chain.confirm(&sent).await {
            Ok(confirmation) => {
                // First log entry that decodes as Ping wins; the rest are skipped
                let event = confirmation.logs.iter().find_map(try_decode_ping);

                info!(
                    index = index,
                    tx_hash = %tx_hash,
                    block_number = confirmation.block_number,
                    gas_used = confirmation.gas_used,
                    "Call confirmed"
                );

                self.log
                    .confirm(
                        &tx_hash,
                        ReceiptSummary {
                            status: confirmation.status,
                            block_number: confirmation.block_number,
                            gas_used: confirmation.gas_used,
                        },
                        event,
                    )
                    .await;
            }
            Err(e) => {
                warn!(index = index, tx_hash = %tx_hash, error = %e, "Confirmation wait failed");
                self.log.fail_sent(&tx_hash, e.to_string()).await;
            }
        }
    }
}
