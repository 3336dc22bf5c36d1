//! Typed request/response messages for the coordinator.
//!
//! The action tag is part of the type, so an unknown action fails to parse
//! instead of reaching the dispatch logic. Wire names keep the original
//! camelCase so serialized messages stay compatible.

use serde::{Deserialize, Serialize};

use crate::har::HarEntry;

/// A request wrapped with its sender identity. The coordinator drops any
/// envelope whose sender is not its own trusted identity.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub sender: String,
    pub request: Request,
}

impl Envelope {
    pub fn new(sender: impl Into<String>, request: Request) -> Self {
        Self {
            sender: sender.into(),
            request,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Persist a candidate entry sequence (newest last).
    SaveHarEntries { entries: Vec<HarEntry> },
    /// Capture the visible tab as a PNG data URL.
    CaptureTab,
    /// Open (`true`, clearing history) or close (`false`) the session.
    SetDevtoolsOpen { open: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// Reply to `SaveHarEntries`: `count` is the authoritative number of
    /// entries persisted, which may be less than requested.
    Saved { ok: bool, count: usize },
    /// Successful `CaptureTab`.
    Screenshot {
        #[serde(rename = "dataUrl")]
        data_url: String,
    },
    /// Failed `CaptureTab`, carrying the host's error message.
    CaptureFailed { error: String },
    /// Reply to `SetDevtoolsOpen`.
    Ack { ok: bool },
}
