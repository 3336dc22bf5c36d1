//! Persisted capture state.
//!
//! A small key-value blob store (memory or file backed) holds three fixed
//! keys: the entry sequence, the latest screenshot, and the session flag.
//! All mutation goes through [`BoundedEntryStore`], which enforces the byte
//! budget on the entry sequence by truncating from the oldest end.

mod bounded;
mod file;
mod kv;

pub use bounded::{BoundedEntryStore, StoredSnapshot};
pub use file::FileStore;
pub use kv::{KvStore, MemoryStore, StoreError};

/// Fixed storage keys, one blob each.
pub mod keys {
    /// Persisted entry sequence (JSON array of HAR entries).
    pub const ENTRIES: &str = "harEntries";
    /// Latest screenshot as a `data:image/png;base64,` URL (JSON string).
    pub const SCREENSHOT: &str = "screenshot";
    /// Whether a capture session is active (JSON bool).
    pub const DEVTOOLS_OPEN: &str = "devtoolsOpen";
}
