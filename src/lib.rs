//! Minimal tamper-evident ledger: SHA-256 hash-linked entries sealed by
//! Proof-of-Work, with a single writer and no persistence.

pub mod config;
pub mod error;
pub mod ledger;

pub use error::{LedgerError, Result};
pub use ledger::{ChainReport, Entry, Ledger, Violation};
