//! Ping Batch Sender
//!
//! Submits a fixed batch of 15 calls to the payable `ping(uint256)` contract
//! function, one at a time, waiting one confirmation per call, and exposes
//! the per-call status log over HTTP.

pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod service;
pub mod types;


pub use config::BatchConfig;
pub use service::BatchSubmitter;
pub use types::*;
