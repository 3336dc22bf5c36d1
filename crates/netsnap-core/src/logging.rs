//! Logging setup.
//!
//! Events go to `netsnap.log` inside the capture state directory, next to
//! the persisted store, so diagnostics never interleave with exported HAR
//! JSON on stdout. When that directory cannot be opened the subscriber
//! degrades to stderr instead of failing the command.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config;

const DEFAULT_FILTER: &str = "info,netsnap=debug";

/// Where `init` ended up sending log events.
#[derive(Debug)]
pub enum LogDestination {
    File(PathBuf),
    Stderr,
}

/// Install the global subscriber. File-backed when the state dir is
/// writable, stderr otherwise. Call once, before any tracing output.
pub fn init() -> LogDestination {
    let state_dir = config::state_dir().ok();
    match state_dir.and_then(|dir| open_log_file(&dir).ok()) {
        Some((file, path)) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
            tracing::debug!("logging to {}", path.display());
            LogDestination::File(path)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(io::stderr)
                .with_ansi(false)
                .init();
            LogDestination::Stderr
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Open (creating as needed) the append-mode log file under `dir`.
fn open_log_file(dir: &Path) -> io::Result<(fs::File, PathBuf)> {
    fs::create_dir_all(dir)?;
    let path = dir.join("netsnap.log");
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}
