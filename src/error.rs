use thiserror::Error;

/// Hard failures raised by ledger operations.
///
/// An empty commit and an invalid chain are not errors: the first is
/// `Ok(None)` from `commit`, the second a `ChainReport` from `validate`.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("staged record #{position} cannot be serialized: {reason}")]
    Serialization { position: usize, reason: String },

    #[error("difficulty {difficulty} exceeds the maximum of {max}")]
    DifficultyOutOfRange { difficulty: u32, max: u32 },

    #[error("mining cancelled at nonce {nonce}")]
    Cancelled { nonce: u64 },

    #[error("no entry at index {0}")]
    NoSuchEntry(usize),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
