use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{CANCEL_CHECK_INTERVAL, GENESIS_PREVIOUS_HASH, GENESIS_RECORD, MAX_DIFFICULTY};
use crate::error::{LedgerError, Result};

/// Hash preimage. Fields are declared in name order so the JSON object comes
/// out key-sorted; record objects are sorted too since `Value` maps are ordered.
#[derive(Serialize)]
struct HashInput<'a> {
    index: u64,
    nonce: u64,
    payload: &'a [Value],
    previous_hash: &'a str,
    timestamp: i64,
}

/// SHA-256 over the canonical JSON encoding of an entry's fields, lowercase hex.
pub fn content_hash(
    index: u64,
    previous_hash: &str,
    payload: &[Value],
    timestamp: i64,
    nonce: u64,
) -> String {
    let preimage = serde_json::to_vec(&HashInput {
        index,
        nonce,
        payload,
        previous_hash,
        timestamp,
    })
    .expect("JSON values always serialize");
    let mut hasher = Sha256::new();
    hasher.update(&preimage);
    hex::encode(hasher.finalize())
}

/// One link of the ledger. `hash` always matches the other fields, except
/// after `Ledger::overwrite_payload`.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    index: u64,
    previous_hash: String,
    payload: Vec<Value>,
    timestamp: i64, // Unix millis (UTC)
    nonce: u64,
    hash: String,
}

impl Entry {
    /// The first entry of every ledger. It is hashed but not mined.
    pub fn genesis() -> Self {
        Self::new(
            0,
            GENESIS_PREVIOUS_HASH.to_string(),
            vec![Value::from(GENESIS_RECORD)],
        )
    }

    /// Create an unmined entry stamped with the current time.
    pub fn new(index: u64, previous_hash: String, payload: Vec<Value>) -> Self {
        Self::with_timestamp(index, previous_hash, payload, Utc::now().timestamp_millis())
    }

    pub fn with_timestamp(
        index: u64,
        previous_hash: String,
        payload: Vec<Value>,
        timestamp: i64,
    ) -> Self {
        let mut entry = Self {
            index,
            previous_hash,
            payload,
            timestamp,
            nonce: 0,
            hash: String::new(),
        };
        entry.hash = entry.compute_hash();
        entry
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn payload(&self) -> &[Value] {
        &self.payload
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Recompute the hash from the fields as they are now.
    pub fn compute_hash(&self) -> String {
        content_hash(
            self.index,
            &self.previous_hash,
            &self.payload,
            self.timestamp,
            self.nonce,
        )
    }

    /// Whether the stored hash starts with `difficulty` hex zeros.
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        meets(&self.hash, difficulty)
    }

    /// Proof-of-Work: bump the nonce until the hash has `difficulty` leading
    /// zeros. Blocks until found.
    pub fn mine(&mut self, difficulty: u32) -> Result<()> {
        self.search(difficulty, None)
    }

    /// Like `mine`, but gives up with `LedgerError::Cancelled` once `cancel`
    /// is set. The flag is polled every `CANCEL_CHECK_INTERVAL` attempts.
    pub fn mine_cancellable(&mut self, difficulty: u32, cancel: &AtomicBool) -> Result<()> {
        self.search(difficulty, Some(cancel))
    }

    pub(crate) fn set_payload(&mut self, payload: Vec<Value>) {
        self.payload = payload;
    }

    fn search(&mut self, difficulty: u32, cancel: Option<&AtomicBool>) -> Result<()> {
        if difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::DifficultyOutOfRange {
                difficulty,
                max: MAX_DIFFICULTY,
            });
        }
        debug!(
            "mining entry {} at difficulty {} from nonce {}",
            self.index, difficulty, self.nonce
        );

        let mut attempts: u64 = 0;
        loop {
            self.hash = self.compute_hash();
            if meets(&self.hash, difficulty) {
                break;
            }
            attempts += 1;
            if let Some(flag) = cancel
                && attempts % CANCEL_CHECK_INTERVAL == 0
                && flag.load(Ordering::Relaxed)
            {
                return Err(LedgerError::Cancelled { nonce: self.nonce });
            }
            self.nonce = self.nonce.wrapping_add(1);
        }

        info!(
            "entry {} mined: {} (nonce {})",
            self.index, self.hash, self.nonce
        );
        Ok(())
    }
}

fn meets(hash: &str, difficulty: u32) -> bool {
    hash.len() >= difficulty as usize
        && hash.bytes().take(difficulty as usize).all(|c| c == b'0')
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = DateTime::<Utc>::from_timestamp_millis(self.timestamp)
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| self.timestamp.to_string());
        let payload = Value::from(self.payload.clone());
        write!(
            f,
            "Entry {} [hash: {}, previous: {}, payload: {}, timestamp: {}, nonce: {}]",
            self.index, self.hash, self.previous_hash, payload, time, self.nonce
        )
    }
}
