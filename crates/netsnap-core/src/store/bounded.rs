//! Bounded entry persistence: keep the most recent entries whose serialized
//! size fits the byte budget.
//!
//! The producer hands over an already-capped candidate sequence (newest
//! last). If the serialized sequence exceeds the budget, the oldest entries
//! are dropped by repeatedly keeping the trailing 70% until it fits; the
//! shrink factor makes termination a geometric certainty. The persisted
//! count is authoritative: callers must not assume their full candidate
//! sequence was kept.

use serde_json::Value;

use crate::config::{NetsnapConfig, PersistFailurePolicy};
use crate::har::HarEntry;

use super::keys;
use super::kv::{KvStore, StoreError};

/// Fraction of the sequence kept per truncation round.
const DECAY: f64 = 0.7;

/// Everything the viewer reads at startup, in one snapshot.
#[derive(Debug, Default)]
pub struct StoredSnapshot {
    pub entries: Vec<HarEntry>,
    pub screenshot: Option<String>,
    pub devtools_open: bool,
}

/// Owns the key-value backend and enforces the entry byte budget.
///
/// This is the only mutation path to the persisted blob; the coordinator
/// serializes calls into it.
pub struct BoundedEntryStore<S: KvStore> {
    store: S,
    capacity: u64,
    policy: PersistFailurePolicy,
}

impl<S: KvStore> BoundedEntryStore<S> {
    pub fn new(store: S, capacity: u64, policy: PersistFailurePolicy) -> Self {
        Self {
            store,
            capacity,
            policy,
        }
    }

    pub fn with_config(store: S, cfg: &NetsnapConfig) -> Self {
        Self::new(store, cfg.storage_limit_bytes, cfg.on_persist_failure)
    }

    /// Persist the candidate sequence, truncating from the oldest end until
    /// the serialized size fits the budget. Returns the count actually
    /// persisted, which may be smaller than the candidate length.
    pub fn save_entries(&mut self, entries: &[HarEntry]) -> Result<usize, StoreError> {
        let mut kept = entries;
        let mut json = serde_json::to_vec(kept)?;
        while json.len() as u64 > self.capacity && !kept.is_empty() {
            let keep = (kept.len() as f64 * DECAY).floor() as usize;
            kept = &kept[kept.len() - keep..];
            json = serde_json::to_vec(kept)?;
        }
        if kept.len() < entries.len() {
            tracing::debug!(
                candidate = entries.len(),
                kept = kept.len(),
                bytes = json.len(),
                "truncated entry sequence to fit budget"
            );
        }

        match self.store.set(keys::ENTRIES, &json) {
            Ok(()) => Ok(kept.len()),
            Err(err) => self.save_fallback(kept, err),
        }
    }

    /// The backend rejected a within-budget write. Under `DropOldest`, keep
    /// the trailing half and retry once; a second failure is swallowed so
    /// the producer is never blocked, at the cost of silent loss.
    fn save_fallback(&mut self, kept: &[HarEntry], err: StoreError) -> Result<usize, StoreError> {
        if self.policy == PersistFailurePolicy::ReportError {
            return Err(err);
        }
        tracing::warn!(error = %err, "entry write failed, retrying with half the sequence");
        let half = &kept[kept.len() - kept.len() / 2..];
        let json = serde_json::to_vec(half)?;
        if let Err(retry_err) = self.store.set(keys::ENTRIES, &json) {
            tracing::warn!(error = %retry_err, "fallback entry write failed, entries lost");
        }
        Ok(half.len())
    }

    /// Replace the stored screenshot with a new data URL.
    pub fn set_screenshot(&mut self, data_url: &str) -> Result<(), StoreError> {
        let json = serde_json::to_vec(&data_url)?;
        self.store.set(keys::SCREENSHOT, &json)
    }

    /// Session opened: clear all persisted state, then mark the flag active.
    pub fn open_session(&mut self) -> Result<(), StoreError> {
        self.store.clear()?;
        self.store.set(keys::DEVTOOLS_OPEN, b"true")
    }

    /// Session closed: flip the flag only, history stays readable.
    pub fn close_session(&mut self) -> Result<(), StoreError> {
        self.store.set(keys::DEVTOOLS_OPEN, b"false")
    }

    /// Read all three keys in one pass (viewer startup).
    pub fn load_snapshot(&self) -> Result<StoredSnapshot, StoreError> {
        let entries = match self.store.get(keys::ENTRIES)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => Vec::new(),
        };
        let screenshot = match self.store.get(keys::SCREENSHOT)? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => None,
        };
        let devtools_open = match self.store.get(keys::DEVTOOLS_OPEN)? {
            Some(bytes) => {
                let flag: Value = serde_json::from_slice(&bytes)?;
                flag.as_bool().unwrap_or(false)
            }
            None => false,
        };
        Ok(StoredSnapshot {
            entries,
            screenshot,
            devtools_open,
        })
    }

    /// Serialized size of the currently persisted entry sequence.
    pub fn persisted_bytes(&self) -> Result<u64, StoreError> {
        Ok(self
            .store
            .get(keys::ENTRIES)?
            .map(|bytes| bytes.len() as u64)
            .unwrap_or(0))
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    /// An entry whose serialized form is roughly `payload_len` bytes.
    fn sized_entry(index: usize, payload_len: usize) -> HarEntry {
        let mut entry: HarEntry = serde_json::from_str(&format!(
            r#"{{"request":{{"method":"GET","url":"https://example.com/item/{}","headers":[]}},
                 "response":{{"status":200,"headers":[]}},"time":12.0}}"#,
            index
        ))
        .unwrap();
        entry
            .extra
            .insert("_payload".to_string(), Value::String("x".repeat(payload_len)));
        entry
    }

    fn store(capacity: u64) -> BoundedEntryStore<MemoryStore> {
        BoundedEntryStore::new(
            MemoryStore::new(),
            capacity,
            PersistFailurePolicy::DropOldest,
        )
    }

    #[test]
    fn small_sequence_kept_whole() {
        let mut store = store(1024 * 1024);
        let entries: Vec<_> = (0..10).map(|i| sized_entry(i, 100)).collect();
        let count = store.save_entries(&entries).unwrap();
        assert_eq!(count, 10);
        let snapshot = store.load_snapshot().unwrap();
        assert_eq!(snapshot.entries.len(), 10);
    }

    #[test]
    fn oversized_sequence_truncates_to_suffix() {
        // ~300 bytes each, 100 entries (~30 KB) against a 10 KB budget.
        let mut store = store(10 * 1024);
        let entries: Vec<_> = (0..100).map(|i| sized_entry(i, 200)).collect();
        let count = store.save_entries(&entries).unwrap();
        assert!(count < 100);
        assert!(count > 0);
        assert!(store.persisted_bytes().unwrap() <= 10 * 1024);

        // Persisted entries are the trailing entries of the input, in order.
        let snapshot = store.load_snapshot().unwrap();
        assert_eq!(snapshot.entries.len(), count);
        let first_kept = 100 - count;
        for (offset, entry) in snapshot.entries.iter().enumerate() {
            assert_eq!(
                entry.url(),
                format!("https://example.com/item/{}", first_kept + offset)
            );
        }
    }

    #[test]
    fn truncation_terminates_on_single_huge_entry() {
        // One entry larger than the whole budget: the sequence decays to
        // empty rather than looping.
        let mut store = store(512);
        let entries = vec![sized_entry(0, 4096)];
        let count = store.save_entries(&entries).unwrap();
        assert_eq!(count, 0);
        assert_eq!(store.load_snapshot().unwrap().entries.len(), 0);
    }

    #[test]
    fn reported_count_matches_persisted() {
        let mut store = store(20 * 1024);
        let entries: Vec<_> = (0..200).map(|i| sized_entry(i, 150)).collect();
        let count = store.save_entries(&entries).unwrap();
        assert_eq!(store.load_snapshot().unwrap().entries.len(), count);
    }

    #[test]
    fn quota_failure_halves_and_acknowledges() {
        // Entries fit the 1 MiB budget but the backend only takes ~4 KB.
        let entries: Vec<_> = (0..20).map(|i| sized_entry(i, 100)).collect();
        let whole = serde_json::to_vec(&entries).unwrap().len() as u64;
        let backend = MemoryStore::with_quota(whole - 1);
        let mut store =
            BoundedEntryStore::new(backend, 1024 * 1024, PersistFailurePolicy::DropOldest);
        let count = store.save_entries(&entries).unwrap();
        assert_eq!(count, 10);
        let snapshot = store.load_snapshot().unwrap();
        assert_eq!(snapshot.entries.len(), 10);
        assert_eq!(snapshot.entries[0].url(), entries[10].url());
    }

    #[test]
    fn quota_failure_surfaces_under_report_error() {
        let entries: Vec<_> = (0..20).map(|i| sized_entry(i, 100)).collect();
        let backend = MemoryStore::with_quota(16);
        let mut store =
            BoundedEntryStore::new(backend, 1024 * 1024, PersistFailurePolicy::ReportError);
        let err = store.save_entries(&entries).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
    }

    #[test]
    fn failed_fallback_still_acknowledges() {
        // Quota so small even the halved write fails; DropOldest still acks
        // with the halved count.
        let entries: Vec<_> = (0..20).map(|i| sized_entry(i, 100)).collect();
        let backend = MemoryStore::with_quota(16);
        let mut store =
            BoundedEntryStore::new(backend, 1024 * 1024, PersistFailurePolicy::DropOldest);
        let count = store.save_entries(&entries).unwrap();
        assert_eq!(count, 10);
    }

    #[test]
    fn session_lifecycle_clears_then_flags() {
        let mut store = store(1024 * 1024);
        let entries: Vec<_> = (0..5).map(|i| sized_entry(i, 50)).collect();
        store.save_entries(&entries).unwrap();
        store.set_screenshot("data:image/png;base64,AAAA").unwrap();

        store.open_session().unwrap();
        let snapshot = store.load_snapshot().unwrap();
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.screenshot.is_none());
        assert!(snapshot.devtools_open);

        store.close_session().unwrap();
        let snapshot = store.load_snapshot().unwrap();
        assert!(!snapshot.devtools_open);
    }

    #[test]
    fn screenshot_overwrites_previous() {
        let mut store = store(1024 * 1024);
        store.set_screenshot("data:image/png;base64,AAAA").unwrap();
        store.set_screenshot("data:image/png;base64,BBBB").unwrap();
        let snapshot = store.load_snapshot().unwrap();
        assert_eq!(
            snapshot.screenshot.as_deref(),
            Some("data:image/png;base64,BBBB")
        );
    }
}
