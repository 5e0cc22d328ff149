//! Ping Batch Sender
//!
//! Submits 15 sequential calls to an on-chain Ping contract and serves the
//! per-call status log over HTTP.

use std::sync::Arc;

use alloy::providers::Provider;
use anyhow::Result;
use tokio::sync::RwLock;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use ping_batch::{
    client::{create_provider, parse_value_per_call, PingClient},
    config::BatchConfig,
    error::ChainError,
    server::{BatchServer, ServerState},
    service::BatchSubmitter,
    types::{BatchLog, BatchStats},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ping_batch=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Ping batch sender starting"
    );

    // Load configuration
    let config = BatchConfig::from_env()?;

    info!(
        rpc = %config.rpc_url,
        contract = %config.ping_contract_address,
        value_per_call = %config.value_per_call,
        server_port = config.server_port,
        "Configuration loaded"
    );

    // Preconditions: signing key, concrete contract address, parseable amount.
    // Any violation aborts here, before a single call can be submitted.
    let signer = config.signer()?;
    let contract_address = config.contract_address()?;
    let default_value = parse_value_per_call(&config.value_per_call)?;

    let provider = create_provider(&config.rpc_url, &config.private_key).await?;

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ChainError::ConnectionFailed {
            url: config.rpc_url.clone(),
            message: e.to_string(),
        })?;

    if config.expected_chain_id != 0 && chain_id != config.expected_chain_id {
        error!(
            expected = config.expected_chain_id,
            actual = chain_id,
            "Chain ID mismatch"
        );
        return Err(ChainError::ChainIdMismatch {
            expected: config.expected_chain_id,
            actual: chain_id,
        }
        .into());
    }

    info!(
        chain_id = chain_id,
        signer = %signer.address(),
        "Connected to chain"
    );

    let client = PingClient::new(contract_address, provider);
    let log = BatchLog::new();
    let stats = Arc::new(RwLock::new(BatchStats::default()));
    let submitter = Arc::new(BatchSubmitter::new(
        Arc::new(client),
        log,
        Arc::clone(&stats),
    ));

    if config.run_on_start {
        submitter.spawn_run(default_value).await;
    }

    let state = Arc::new(ServerState::new(
        Arc::clone(&submitter),
        stats,
        config.value_per_call.clone(),
    ));
    let server = BatchServer::new(state, config.server_port);

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!(error = %e, "Batch server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Batch sender stopped");
    Ok(())
}
