//! HAR container: parse a full log, build an export document.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::model::HarEntry;
use super::HAR_VERSION;

/// Top-level HAR wrapper, both on import and export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarDocument {
    pub log: HarLog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarLog {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<HarCreator>,
    #[serde(default)]
    pub entries: Vec<HarEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarCreator {
    pub name: String,
    pub version: String,
}

/// Parse a serialized HAR document and return its entries.
pub fn parse_log(bytes: &[u8]) -> Result<Vec<HarEntry>> {
    let doc: HarDocument = serde_json::from_slice(bytes).context("parse HAR JSON")?;
    Ok(doc.log.entries)
}

/// Wrap a selected subset of entries in a HAR 1.2 container for export.
pub fn build_document(entries: Vec<HarEntry>) -> HarDocument {
    HarDocument {
        log: HarLog {
            version: HAR_VERSION.to_string(),
            creator: Some(HarCreator {
                name: "NetSnap".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
            entries,
        },
    }
}
