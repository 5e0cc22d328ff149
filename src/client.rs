//! Chain client for the Ping contract

use alloy::{
    network::EthereumWallet,
    primitives::{
        utils::parse_ether,
        Address, TxHash, U256,
    },
    providers::{PendingTransactionBuilder, Provider, ProviderBuilder},
    rpc::types::Log,
    signers::local::PrivateKeySigner,
    sol,
    transports::http::Http,
};
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use tracing::debug;

use crate::error::{CallError, ConfigError};
use crate::types::PingEvent;

// Generate contract bindings for the Ping contract
sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Pinger {
        event Ping(address indexed sender, uint256 indexed index, uint256 value);

        function ping(uint256 index) external payable;
    }
);

type HttpTransport = Http<reqwest::Client>;

/// Blocks mined after inclusion before a call counts as settled
const CONFIRMATION_DEPTH: u64 = 1;

/// Handle for a submitted call awaiting confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentCall {
    pub tx_hash: TxHash,
}

/// Outcome of awaiting a submitted call to the confirmation depth
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub status: bool,
    pub block_number: u64,
    pub gas_used: u64,
    /// Raw receipt logs, scanned by the submitter for the Ping event
    pub logs: Vec<Log>,
}

/// Chain access boundary consumed by the batch submitter
#[async_trait]
pub trait PingChain: Send + Sync {
    /// Submit `ping(index)` with the attached payment, returning the tx hash
    async fn submit_ping(&self, index: u64, value: U256) -> Result<SentCall, CallError>;

    /// Await a submitted call to a confirmation depth of 1 block
    async fn confirm(&self, call: &SentCall) -> Result<Confirmation, CallError>;
}

/// Client for Ping contract interactions
pub struct PingClient<P> {
    contract: Pinger::PingerInstance<HttpTransport, P>,
    provider: P,
}

impl<P: Provider<HttpTransport> + Clone> PingClient<P> {
    /// Create a new ping client
    pub fn new(address: Address, provider: P) -> Self {
        let contract = Pinger::new(address, provider.clone());
        Self { contract, provider }
    }

    /// Contract address this client is bound to
    pub fn address(&self) -> Address {
        *self.contract.address()
    }
}

#[async_trait]
impl<P> PingChain for PingClient<P>
where
    P: Provider<HttpTransport> + Clone + Send + Sync + 'static,
{
    async fn submit_ping(&self, index: u64, value: U256) -> Result<SentCall, CallError> {
        let pending = self
            .contract
            .ping(U256::from(index))
            .value(value)
            .send()
            .await
            .map_err(|e| CallError::Submission(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        debug!(index = index, tx_hash = %tx_hash, "Ping submitted");

        Ok(SentCall { tx_hash })
    }

    async fn confirm(&self, call: &SentCall) -> Result<Confirmation, CallError> {
        let receipt =
            PendingTransactionBuilder::new(self.provider.root().clone(), call.tx_hash)
                .with_required_confirmations(CONFIRMATION_DEPTH)
                .get_receipt()
                .await
                .map_err(|e| CallError::Confirmation(e.to_string()))?;

        let block_number = receipt.block_number.unwrap_or(0);
        if !receipt.status() {
            return Err(CallError::Reverted { block_number });
        }

        Ok(Confirmation {
            status: receipt.status(),
            block_number,
            gas_used: receipt.gas_used as u64,
            logs: receipt.inner.logs().to_vec(),
        })
    }
}

/// Attempt to decode a receipt log as the Ping event.
///
/// No side effects: a foreign or malformed log entry yields None.
pub fn try_decode_ping(log: &Log) -> Option<PingEvent> {
    let decoded = Pinger::Ping::decode_log(&log.inner, true).ok()?;
    Some(PingEvent {
        sender: decoded.data.sender.to_string(),
        index: decoded.data.index.to_string(),
        value: decoded.data.value.to_string(),
    })
}

/// Parse the per-call payment from a decimal string in the chain's major unit.
///
/// Exact fixed-point conversion to wei; "1.5" becomes 1_500_000_000_000_000_000.
pub fn parse_value_per_call(value: &str) -> Result<U256, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(U256::ZERO);
    }
    parse_ether(trimmed).map_err(|e| ConfigError::InvalidAmount {
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// Create a provider with signer for the given config
pub async fn create_provider(
    rpc_url: &str,
    private_key: &str,
) -> anyhow::Result<impl Provider<HttpTransport> + Clone> {
    let signer: PrivateKeySigner = private_key.parse()?;
    let wallet = EthereumWallet::from(signer);

    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(wallet)
        .on_http(rpc_url.parse()?);

    Ok(provider)
}
