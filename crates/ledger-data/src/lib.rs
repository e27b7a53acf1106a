//! Data ingestion layer for the TON ledger tools.
//!
//! Responsible for discovering and reading wallet dumps, segmenting them into
//! transaction records, aggregating balances and address statistics, and
//! running the top-level parsing pipeline.

pub mod aggregator;
pub mod analysis;
pub mod reader;
pub mod reconcile;
pub mod segmenter;

pub use ledger_core as core;
