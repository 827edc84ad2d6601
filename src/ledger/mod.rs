pub mod entry;
pub mod model;

pub use entry::{Entry, content_hash};
pub use model::{ChainReport, Ledger, Violation};

/// `previous_hash` of the genesis entry.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Placeholder record carried by the genesis entry.
pub const GENESIS_RECORD: &str = "Genesis Block";

/// Default Proof-of-Work difficulty (number of leading zeros).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// A hex SHA-256 digest has 64 characters; anything above can never be met.
pub const MAX_DIFFICULTY: u32 = 64;

/// How many nonces a cancellable search tries between flag checks.
pub const CANCEL_CHECK_INTERVAL: u64 = 4096;
