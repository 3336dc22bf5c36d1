//! Key-value blob store trait and the in-memory backend.

use std::collections::HashMap;

/// Error from a key-value backend. `QuotaExceeded` is distinguished so the
/// bounded store can run its reduced-payload fallback on it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend refused the write because its own byte quota would be
    /// exceeded (the write was within the entry budget but not the
    /// backend's).
    #[error("store quota exceeded: write of {incoming} bytes over {quota}-byte quota")]
    QuotaExceeded { incoming: u64, quota: u64 },
    #[error("serialize store value")]
    Serialize(#[from] serde_json::Error),
    #[error("store io")]
    Io(#[from] std::io::Error),
}

/// Minimal key-value blob store: each key holds one opaque serialized value,
/// writes are all-or-nothing per key.
pub trait KvStore {
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
    /// Remove every key. Used when a new session starts.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// In-memory backend with an optional total-byte quota.
///
/// The quota exists to model host stores that can reject a write on their
/// own capacity grounds; tests use it to exercise the fallback path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: HashMap<String, Vec<u8>>,
    quota: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once total stored bytes would exceed `quota`.
    pub fn with_quota(quota: u64) -> Self {
        Self {
            map: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// Total bytes currently stored across all keys.
    pub fn used_bytes(&self) -> u64 {
        self.map.values().map(|v| v.len() as u64).sum()
    }

    fn check_quota(&self, key: &str, incoming: usize) -> Result<(), StoreError> {
        let Some(quota) = self.quota else {
            return Ok(());
        };
        let replaced = self.map.get(key).map(|v| v.len() as u64).unwrap_or(0);
        let after = self.used_bytes() - replaced + incoming as u64;
        if after > quota {
            return Err(StoreError::QuotaExceeded {
                incoming: incoming as u64,
                quota,
            });
        }
        Ok(())
    }
}

impl KvStore for MemoryStore {
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.check_quota(key, value.len())?;
        self.map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.map.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.map.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.map.clear();
        Ok(())
    }
}
