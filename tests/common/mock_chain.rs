//! Scripted mock of the chain capability for integration testing
//!
//! Lets tests fail specific indices at the submission or confirmation step
//! and control which logs each confirmed receipt carries, while recording
//! the exact operation order the submitter drove.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use alloy::primitives::{address, Address, TxHash, U256};
use alloy::rpc::types::Log;
use alloy::sol;
use alloy_sol_types::SolEvent;
use async_trait::async_trait;

use ping_batch::client::{Confirmation, PingChain, SentCall};
use ping_batch::error::CallError;

sol! {
    event Ping(address indexed sender, uint256 indexed index, uint256 value);
    event Pong(uint256 value);
}

/// Sender address baked into every emitted Ping log
pub const MOCK_SENDER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

/// Per-index failure script and log shaping for a mock run
#[derive(Debug, Clone)]
pub struct ChainScript {
    /// Indices whose submission is rejected (no hash obtained)
    pub fail_submit_on: HashSet<u64>,
    /// Indices whose confirmation wait errors after a hash was obtained
    pub fail_confirm_on: HashSet<u64>,
    /// Emit a decodable Ping log in each confirmed receipt
    pub emit_ping_event: bool,
    /// Emit a non-Ping log ahead of everything else in each receipt
    pub emit_foreign_log: bool,
}

impl Default for ChainScript {
    fn default() -> Self {
        Self {
            fail_submit_on: HashSet::new(),
            fail_confirm_on: HashSet::new(),
            emit_ping_event: true,
            emit_foreign_log: false,
        }
    }
}

/// One observed capability call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Submit { index: u64 },
    Confirm { index: u64 },
}

#[derive(Debug, Default)]
struct MockChainState {
    operations: Vec<Operation>,
    submitted_values: Vec<U256>,
    hash_index: HashMap<TxHash, u64>,
    next_block: u64,
}

/// Mock chain capability
pub struct MockChain {
    script: ChainScript,
    state: Arc<RwLock<MockChainState>>,
}

impl MockChain {
    pub fn new(script: ChainScript) -> Self {
        Self {
            script,
            state: Arc::new(RwLock::new(MockChainState::default())),
        }
    }

    /// Observed capability calls, in order
    pub fn operations(&self) -> Vec<Operation> {
        self.state.read().unwrap().operations.clone()
    }

    /// Attached payment of every accepted submission, in order
    pub fn submitted_values(&self) -> Vec<U256> {
        self.state.read().unwrap().submitted_values.clone()
    }

    fn hash_for(index: u64) -> TxHash {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&index.to_be_bytes());
        TxHash::from(bytes)
    }

    fn receipt_logs(&self, index: u64, value: U256) -> Vec<Log> {
        let mut logs = Vec::new();

        if self.script.emit_foreign_log {
            let data = Pong { value: U256::from(999u64) }.encode_log_data();
            logs.push(Log {
                inner: alloy::primitives::Log {
                    address: MOCK_SENDER,
                    data,
                },
                ..Default::default()
            });
        }

        if self.script.emit_ping_event {
            let data = Ping {
                sender: MOCK_SENDER,
                index: U256::from(index),
                value,
            }
            .encode_log_data();
            logs.push(Log {
                inner: alloy::primitives::Log {
                    address: MOCK_SENDER,
                    data,
                },
                ..Default::default()
            });
        }

        logs
    }
}

#[async_trait]
impl PingChain for MockChain {
    async fn submit_ping(&self, index: u64, value: U256) -> Result<SentCall, CallError> {
        let mut state = self.state.write().unwrap();
        state.operations.push(Operation::Submit { index });

        if self.script.fail_submit_on.contains(&index) {
            return Err(CallError::Submission("node rejected transaction".into()));
        }

        let tx_hash = Self::hash_for(index);
        state.hash_index.insert(tx_hash, index);
        state.submitted_values.push(value);

        Ok(SentCall { tx_hash })
    }

    async fn confirm(&self, call: &SentCall) -> Result<Confirmation, CallError> {
        let (index, block_number, value) = {
            let mut state = self.state.write().unwrap();
            let index = *state
                .hash_index
                .get(&call.tx_hash)
                .expect("confirm called for unknown hash");
            state.operations.push(Operation::Confirm { index });
            state.next_block += 1;
            let value = state.submitted_values.last().copied().unwrap_or(U256::ZERO);
            (index, state.next_block, value)
        };

        if self.script.fail_confirm_on.contains(&index) {
            return Err(CallError::Confirmation("wait timed out".into()));
        }

        Ok(Confirmation {
            status: true,
            block_number,
            gas_used: 21_000 + index,
            logs: self.receipt_logs(index, value),
        })
    }
}
