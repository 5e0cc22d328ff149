//! Common test utilities for integration tests

pub mod mock_chain;

pub use mock_chain::{ChainScript, MockChain, Operation};
