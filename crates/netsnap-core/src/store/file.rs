//! File-backed key-value store: one file per key under a directory.
//!
//! Writes go to a `.part` temp file and are renamed into place, so readers
//! never see a torn value. An optional quota models a capacity-limited host
//! store.

use std::fs;
use std::path::{Path, PathBuf};

use super::kv::{KvStore, StoreError};

#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    quota: Option<u64>,
}

impl FileStore {
    /// Open (or create) a store directory.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            quota: None,
        })
    }

    /// Open with a total-byte quota across all keys.
    pub fn open_with_quota(dir: &Path, quota: u64) -> Result<Self, StoreError> {
        let mut store = Self::open(dir)?;
        store.quota = Some(quota);
        Ok(store)
    }

    fn key_path(&self, key: &str) -> PathBuf {
        // Keys are fixed short names; no escaping needed.
        self.dir.join(key)
    }

    fn used_bytes_excluding(&self, key: &str) -> Result<u64, StoreError> {
        let mut total = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_name() == key {
                continue;
            }
            let meta = entry.metadata()?;
            if meta.is_file() {
                total += meta.len();
            }
        }
        Ok(total)
    }
}

impl KvStore for FileStore {
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            let after = self.used_bytes_excluding(key)? + value.len() as u64;
            if after > quota {
                return Err(StoreError::QuotaExceeded {
                    incoming: value.len() as u64,
                    quota,
                });
            }
        }
        let final_path = self.key_path(key);
        let mut temp_path = final_path.as_os_str().to_owned();
        temp_path.push(".part");
        let temp_path = PathBuf::from(temp_path);
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &final_path)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.key_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.metadata()?.is_file() {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}
