use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default byte budget for persisted entries (8 MiB).
pub const DEFAULT_STORAGE_LIMIT: u64 = 8 * 1024 * 1024;

/// Default cap on candidate entries kept by the producer-side accumulator.
pub const DEFAULT_MAX_ENTRIES: usize = 2000;

/// Default number of rows revealed per page in the viewer.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// What to do when the backing store rejects a write that already fit the
/// byte budget (e.g. the backend's own quota): keep halving and acknowledge
/// whatever survived, or surface the failure to the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistFailurePolicy {
    /// Halve the payload, retry once, and acknowledge the surviving count
    /// even if the retry also fails. The producer is never blocked; data may
    /// be lost silently (a warning is logged).
    #[default]
    DropOldest,
    /// Report the backend error to the producer instead of acknowledging.
    ReportError,
}

/// Global configuration loaded from `~/.config/netsnap/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetsnapConfig {
    /// Byte budget for the persisted entry sequence.
    pub storage_limit_bytes: u64,
    /// Maximum candidate entries the producer keeps per session.
    pub max_entries: usize,
    /// Rows revealed per page in the viewer.
    pub page_size: usize,
    /// Policy when the backend rejects a within-budget write.
    #[serde(default)]
    pub on_persist_failure: PersistFailurePolicy,
}

impl Default for NetsnapConfig {
    fn default() -> Self {
        Self {
            storage_limit_bytes: DEFAULT_STORAGE_LIMIT,
            max_entries: DEFAULT_MAX_ENTRIES,
            page_size: DEFAULT_PAGE_SIZE,
            on_persist_failure: PersistFailurePolicy::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("netsnap")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Directory for persisted capture state (the file-backed store).
pub fn state_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("netsnap")?;
    Ok(xdg_dirs.get_state_home().join("netsnap"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<NetsnapConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = NetsnapConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: NetsnapConfig = toml::from_str(&data)?;
    Ok(cfg)
}
