//! HAR (HTTP Archive) 1.2 data model.
//!
//! Entries are treated as mostly-opaque records: the fields the store and
//! viewer need (method, URL, status, size, timing, resource type) are typed,
//! everything else rides along in a flattened map so round-tripping a HAR
//! file does not lose payload.

mod export;
mod model;

pub use export::{build_document, parse_log, HarCreator, HarDocument, HarLog};
pub use model::{HarContent, HarEntry, HarHeader, HarRequest, HarResponse};

/// HAR format version emitted by the export surface.
pub const HAR_VERSION: &str = "1.2";
