//! Serde structures for HAR 1.2 entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One observed request/response exchange.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<HarRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<HarResponse>,
    /// Total elapsed time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    /// Chrome's resource-type tag ("xhr", "script", ...). Not part of HAR
    /// proper, hence the underscore prefix on the wire.
    #[serde(
        default,
        rename = "_resourceType",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_type: Option<String>,
    /// Everything else in the record, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarRequest {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HarHeader>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarResponse {
    #[serde(default)]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HarHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<HarContent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarContent {
    /// Decoded body size in bytes; -1 when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    /// Response body. Stripped before an entry becomes a storage candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarHeader {
    pub name: String,
    pub value: String,
}

impl HarEntry {
    /// Lower-cased resource-type tag, empty string when absent.
    pub fn resource_tag(&self) -> String {
        self.resource_type
            .as_deref()
            .unwrap_or("")
            .to_ascii_lowercase()
    }

    /// Request URL, empty string when the request block is missing.
    pub fn url(&self) -> &str {
        self.request.as_ref().map(|r| r.url.as_str()).unwrap_or("")
    }

    /// Request method, "?" when the request block is missing.
    pub fn method(&self) -> &str {
        self.request
            .as_ref()
            .map(|r| r.method.as_str())
            .unwrap_or("?")
    }

    /// Response status, 0 when the response block is missing.
    pub fn status(&self) -> u16 {
        self.response.as_ref().map(|r| r.status).unwrap_or(0)
    }

    /// Decoded body size, None when unknown or negative sentinel.
    pub fn body_size(&self) -> Option<i64> {
        self.response
            .as_ref()
            .and_then(|r| r.content.as_ref())
            .and_then(|c| c.size)
    }

    /// Drop the response body text, keeping size and the rest of the record.
    /// Candidate entries are stripped so bodies never count against the
    /// storage budget.
    pub fn strip_body(&mut self) {
        if let Some(response) = self.response.as_mut() {
            if let Some(content) = response.content.as_mut() {
                content.text = None;
            }
        }
    }
}
