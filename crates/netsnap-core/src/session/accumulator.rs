//! Producer-side entry accumulator.
//!
//! Owns the entries observed during one session. The store never sees more
//! than `max_entries` candidates at a time, and candidates are stripped of
//! response bodies before they leave the accumulator. Lifecycle is explicit:
//! create at session start, drop at session end.

use crate::har::HarEntry;

#[derive(Debug)]
pub struct EntryAccumulator {
    entries: Vec<HarEntry>,
    max_entries: usize,
}

impl EntryAccumulator {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
        }
    }

    /// Record one observed exchange.
    pub fn push(&mut self, entry: HarEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = HarEntry>) {
        self.entries.extend(entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidate sequence for the store: the most recent `max_entries`
    /// entries, bodies stripped, oldest first.
    pub fn candidate(&self) -> Vec<HarEntry> {
        let start = self.entries.len().saturating_sub(self.max_entries);
        self.entries[start..]
            .iter()
            .map(|entry| {
                let mut stripped = entry.clone();
                stripped.strip_body();
                stripped
            })
            .collect()
    }
}
