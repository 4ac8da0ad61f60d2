//! Hold counts per note number.

use crate::error::ChordError;
use std::collections::BTreeMap;

/// Maps each sounding note number to the number of chords holding it.
/// Notes with a count of zero are absent.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    holds: BTreeMap<u8, u32>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the hold count. Returns `true` when the note went from silent to sounding.
    pub fn hold(&mut self, note: u8) -> bool {
        let count = self.holds.entry(note).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Decrement the hold count. Returns `true` when the note went silent.
    ///
    /// Releasing a note that is not held leaves the ledger untouched and fails with
    /// `LedgerUnderflow`.
    pub fn release(&mut self, note: u8) -> Result<bool, ChordError> {
        let Some(count) = self.holds.get_mut(&note) else {
            return Err(ChordError::LedgerUnderflow { note });
        };
        *count -= 1;
        if *count == 0 {
            self.holds.remove(&note);
            return Ok(true);
        }
        Ok(false)
    }

    pub fn count(&self, note: u8) -> u32 {
        self.holds.get(&note).copied().unwrap_or(0)
    }

    /// Sounding notes in ascending order.
    pub fn notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.holds.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.holds.is_empty()
    }
}
