//! Screenshot capture seam.
//!
//! The host's capture primitive sits behind a trait so the coordinator stays
//! host-agnostic; the file-backed implementation turns an existing PNG into
//! the same `data:image/png;base64,` URL a live capture would produce.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::{Path, PathBuf};

/// Prefix every valid screenshot data URL starts with.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// PNG file signature.
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// True if `url` looks like a PNG screenshot data URL.
pub fn is_valid_screenshot_url(url: &str) -> bool {
    url.starts_with(PNG_DATA_URL_PREFIX)
}

/// Captures the visible tab as a PNG data URL. A failure maps to an explicit
/// error response, never a dropped reply.
pub trait TabCapture {
    fn capture_visible_tab(&mut self) -> Result<String>;
}

/// Capture backend for coordinators that never take screenshots (e.g. a
/// pure import flow). Always reports failure.
#[derive(Debug, Default)]
pub struct NoTabCapture;

impl TabCapture for NoTabCapture {
    fn capture_visible_tab(&mut self) -> Result<String> {
        anyhow::bail!("no capture source configured")
    }
}

/// Capture backend that reads a PNG from disk (CLI and test usage).
#[derive(Debug)]
pub struct FileTabCapture {
    path: PathBuf,
}

impl FileTabCapture {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl TabCapture for FileTabCapture {
    fn capture_visible_tab(&mut self) -> Result<String> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("read screenshot source: {}", self.path.display()))?;
        if bytes.len() < PNG_MAGIC.len() || bytes[..PNG_MAGIC.len()] != PNG_MAGIC {
            anyhow::bail!("not a PNG file: {}", self.path.display());
        }
        Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(&bytes)))
    }
}
