//! Error types for the batch sender
//!
//! Two classes matter here: configuration errors, which are detected before a
//! run starts and prevent any call from being submitted, and per-call errors,
//! which are contained within the loop iteration that produced them.

use thiserror::Error;

/// Configuration-related errors
///
/// All of these are fatal: the run never starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid contract address: {0}")]
    InvalidAddress(String),

    #[error("Contract address is unset or still the zero placeholder")]
    PlaceholderAddress,

    #[error("Invalid private key format")]
    InvalidPrivateKey,

    #[error("Invalid value per call {value:?}: {message}")]
    InvalidAmount { value: String, message: String },
}

/// Chain connection errors (startup preflight)
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Failed to connect to RPC at {url}: {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },
}

/// Per-call submission/confirmation errors
///
/// Rendered into the failed record's message; never escape the loop.
#[derive(Error, Debug)]
pub enum CallError {
    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Confirmation wait failed: {0}")]
    Confirmation(String),

    #[error("Transaction reverted in block {block_number}")]
    Reverted { block_number: u64 },
}
