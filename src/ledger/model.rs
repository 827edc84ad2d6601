use std::sync::atomic::AtomicBool;

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use super::{Entry, MAX_DIFFICULTY};
use crate::error::{LedgerError, Result};

/// Why an entry failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The stored hash no longer matches the entry's fields.
    HashMismatch,
    /// `previous_hash` differs from the predecessor's hash.
    BrokenLink,
}

/// Outcome of `Ledger::validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainReport {
    Valid,
    Invalid { index: usize, violation: Violation },
}

impl ChainReport {
    pub fn is_valid(&self) -> bool {
        matches!(self, ChainReport::Valid)
    }

    /// Index of the first failing entry, if any.
    pub fn failing_index(&self) -> Option<usize> {
        match self {
            ChainReport::Valid => None,
            ChainReport::Invalid { index, .. } => Some(*index),
        }
    }
}

/// In-memory hash-linked ledger with Proof-of-Work sealing and a single writer.
#[derive(Debug)]
pub struct Ledger {
    entries: Vec<Entry>,
    // Conversion failures are kept and reported by `commit`.
    staged: Vec<std::result::Result<Value, String>>,
    difficulty: u32,
}

impl Ledger {
    /// Initialize a new ledger holding only the genesis entry.
    pub fn new(difficulty: u32) -> Self {
        Self {
            entries: vec![Entry::genesis()],
            staged: Vec::new(),
            difficulty,
        }
    }

    /// Queue a record for the next commit.
    ///
    /// Records are converted to JSON here, so non-finite floats become `null`.
    pub fn stage<T: Serialize>(&mut self, record: T) {
        let converted = serde_json::to_value(record).map_err(|e| e.to_string());
        debug!("staged record #{}", self.staged.len());
        self.staged.push(converted);
    }

    /// Mine the staged records into a new entry and append it.
    ///
    /// Returns `Ok(None)` when nothing is staged. On error the ledger is left
    /// exactly as it was, staged records included.
    pub fn commit(&mut self) -> Result<Option<&Entry>> {
        let Some(mut entry) = self.next_entry()? else {
            debug!("nothing staged, commit skipped");
            return Ok(None);
        };
        entry.mine(self.difficulty)?;
        Ok(Some(self.append(entry)))
    }

    /// Same as `commit`, but mining stops with `LedgerError::Cancelled` once
    /// `cancel` is set.
    pub fn commit_cancellable(&mut self, cancel: &AtomicBool) -> Result<Option<&Entry>> {
        let Some(mut entry) = self.next_entry()? else {
            debug!("nothing staged, commit skipped");
            return Ok(None);
        };
        entry.mine_cancellable(self.difficulty, cancel)?;
        Ok(Some(self.append(entry)))
    }

    /// Check every hash and every back-reference, stopping at the first failure.
    pub fn validate(&self) -> ChainReport {
        for i in 1..self.entries.len() {
            let current = &self.entries[i];
            let prev = &self.entries[i - 1];

            if current.hash() != current.compute_hash() {
                warn!("entry {} hash is invalid", current.index());
                return ChainReport::Invalid {
                    index: i,
                    violation: Violation::HashMismatch,
                };
            }

            if current.previous_hash() != prev.hash() {
                warn!("entry {} previous hash mismatch", current.index());
                return ChainReport::Invalid {
                    index: i,
                    violation: Violation::BrokenLink,
                };
            }
        }

        ChainReport::Valid
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_valid()
    }

    /// Replace the payload of a sealed entry without rehashing it.
    ///
    /// This breaks the entry's seal on purpose; `validate` reports it.
    pub fn overwrite_payload(&mut self, index: usize, payload: Vec<Value>) -> Result<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(LedgerError::NoSuchEntry(index))?;
        entry.set_payload(payload);
        Ok(())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Return the last entry in the ledger.
    pub fn latest(&self) -> &Entry {
        self.entries
            .last()
            .expect("ledger always holds the genesis entry")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the genesis entry is never removed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Number of records waiting for the next commit.
    pub fn staged(&self) -> usize {
        self.staged.len()
    }

    /// Drop every staged record, e.g. after a commit failed on one of them.
    pub fn discard_staged(&mut self) {
        self.staged.clear();
    }

    /// Build the unmined successor entry, failing before any mining work.
    fn next_entry(&self) -> Result<Option<Entry>> {
        if self.staged.is_empty() {
            return Ok(None);
        }
        if self.difficulty > MAX_DIFFICULTY {
            return Err(LedgerError::DifficultyOutOfRange {
                difficulty: self.difficulty,
                max: MAX_DIFFICULTY,
            });
        }

        let payload = self
            .staged
            .iter()
            .enumerate()
            .map(|(position, record)| {
                record
                    .clone()
                    .map_err(|reason| LedgerError::Serialization { position, reason })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Entry::new(
            self.entries.len() as u64,
            self.latest().hash().to_string(),
            payload,
        )))
    }

    fn append(&mut self, entry: Entry) -> &Entry {
        self.entries.push(entry);
        self.staged.clear();
        self.latest()
    }
}
