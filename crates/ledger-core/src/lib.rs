//! Shared domain layer for the TON ledger tools.
//!
//! Holds the transaction model, the date and value parsers used while
//! segmenting dumps, the address classifier, configuration, and the common
//! error type.

pub mod categories;
pub mod dates;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod values;

pub use error::{LedgerError, Result};
