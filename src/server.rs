//! HTTP surface for the batch sender
//!
//! Provides the trigger and observation endpoints:
//! - POST /run - start a batch run (409 if one is in progress)
//! - GET /status - current run snapshot (the per-call record log)
//! - GET /health - liveness probe
//! - GET /metrics - Prometheus-compatible metrics

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::client::parse_value_per_call;
use crate::service::BatchSubmitter;
use crate::types::{BatchStats, RunState};

/// Server state shared across handlers
pub struct ServerState {
    /// Service start time for uptime calculation
    pub start_time: Instant,

    /// Batch submitter driving runs
    pub submitter: Arc<BatchSubmitter>,

    /// Statistics across runs
    pub stats: Arc<RwLock<BatchStats>>,

    /// Configured per-call payment, used when the trigger carries none
    pub default_value_per_call: String,
}

impl ServerState {
    pub fn new(
        submitter: Arc<BatchSubmitter>,
        stats: Arc<RwLock<BatchStats>>,
        default_value_per_call: String,
    ) -> Self {
        Self {
            start_time: Instant::now(),
            submitter,
            stats,
            default_value_per_call,
        }
    }
}

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// Trigger request body; the payment override is the only input
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    pub value_per_call: Option<String>,
}

/// Trigger response on accepted runs
#[derive(Debug, Serialize)]
pub struct RunStarted {
    pub started: bool,
    pub value_per_call: String,
}

/// Health check handler - liveness probe
async fn health_handler(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Status handler - the observable run log
async fn status_handler(State(state): State<Arc<ServerState>>) -> Json<RunState> {
    Json(state.submitter.log().snapshot().await)
}

/// Trigger handler - starts a batch run
async fn run_handler(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let request: RunRequest = if body.is_empty() {
        RunRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": format!("invalid request body: {e}") })),
                )
                    .into_response();
            }
        }
    };

    let raw_value = request
        .value_per_call
        .unwrap_or_else(|| state.default_value_per_call.clone());

    // Configuration gate: an unparseable amount means the run never starts
    let value = match parse_value_per_call(&raw_value) {
        Ok(value) => value,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    if !state.submitter.spawn_run(value).await {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": "a batch run is already in progress" })),
        )
            .into_response();
    }

    (
        StatusCode::ACCEPTED,
        Json(RunStarted {
            started: true,
            value_per_call: raw_value,
        }),
    )
        .into_response()
}

/// Metrics handler - Prometheus format
async fn metrics_handler(State(state): State<Arc<ServerState>>) -> String {
    let stats = state.stats.read().await;
    let uptime = state.start_time.elapsed().as_secs();
    let running = if state.submitter.log().is_running().await {
        1
    } else {
        0
    };

    format!(
        r#"# HELP ping_batch_calls_total Total number of calls by terminal stage
# TYPE ping_batch_calls_total counter
ping_batch_calls_total{{status="confirmed"}} {}
ping_batch_calls_total{{status="failed"}} {}

# HELP ping_batch_runs_total Total number of completed batch runs
# TYPE ping_batch_runs_total counter
ping_batch_runs_total {}

# HELP ping_batch_running Whether a batch run is in progress
# TYPE ping_batch_running gauge
ping_batch_running {}

# HELP ping_batch_uptime_seconds Service uptime in seconds
# TYPE ping_batch_uptime_seconds gauge
ping_batch_uptime_seconds {}
"#,
        stats.calls_confirmed, stats.calls_failed, stats.runs_completed, running, uptime,
    )
}

/// Create the server router
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/run", post(run_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server wrapping the batch submitter
pub struct BatchServer {
    state: Arc<ServerState>,
    port: u16,
}

impl BatchServer {
    /// Create a new server
    pub fn new(state: Arc<ServerState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Run the server
    pub async fn run(&self) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let router = create_router(Arc::clone(&self.state));

        info!(port = self.port, "Batch server starting");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
