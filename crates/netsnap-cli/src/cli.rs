use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use netsnap_core::config::{self, NetsnapConfig};
use netsnap_core::format::{extract_path, format_size, format_time, status_class};
use netsnap_core::har::{build_document, parse_log};
use netsnap_core::session::{
    self, is_valid_screenshot_url, Coordinator, Envelope, EntryAccumulator, FileTabCapture,
    NoTabCapture, Request, Response,
};
use netsnap_core::store::{BoundedEntryStore, FileStore};
use netsnap_core::viewer::{type_label, TypeFilter, ViewState};

/// Identity the coordinator trusts; every CLI envelope carries it.
const SELF_ID: &str = "netsnap";

/// Top-level CLI for the NetSnap capture toolkit.
#[derive(Debug, Parser)]
#[command(name = "netsnap")]
#[command(about = "NetSnap: bounded HAR capture storage and inspection", long_about = None)]
pub struct Cli {
    /// Store directory (defaults to the XDG state dir).
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Start a fresh capture session from a HAR file (clears stored history).
    Import {
        /// Path to the HAR file.
        path: PathBuf,
    },

    /// List stored entries with optional filters, a page at a time.
    List {
        /// Resource type filter (all, fetch_xhr, script, css, image, other, ...).
        #[arg(long, default_value = "all")]
        r#type: String,

        /// Case-insensitive substring match on path+query.
        #[arg(long)]
        filter: Option<String>,

        /// Number of pages to reveal.
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },

    /// Export a selection of stored entries as a HAR 1.2 document.
    Export {
        /// Export every entry that passes the filters.
        #[arg(long, conflicts_with = "select")]
        all: bool,

        /// Comma-separated positions in the filtered list (e.g. 0,2,5).
        #[arg(long)]
        select: Option<String>,

        /// Resource type filter applied before selection.
        #[arg(long, default_value = "all")]
        r#type: String,

        /// Text filter applied before selection.
        #[arg(long)]
        filter: Option<String>,

        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Record a screenshot from a PNG file into the store.
    Capture {
        /// Path to the PNG file.
        path: PathBuf,
    },

    /// Show stored entry count, session flag, and screenshot presence.
    Status,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let store_dir = match &cli.store {
            Some(dir) => dir.clone(),
            None => config::state_dir()?,
        };

        match cli.command {
            CliCommand::Import { path } => import(&store_dir, &cfg, &path).await,
            CliCommand::List {
                r#type,
                filter,
                pages,
            } => list(&store_dir, &cfg, &r#type, filter.as_deref(), pages),
            CliCommand::Export {
                all,
                select,
                r#type,
                filter,
                output,
            } => export(
                &store_dir,
                &cfg,
                all,
                select.as_deref(),
                &r#type,
                filter.as_deref(),
                output.as_deref(),
            ),
            CliCommand::Capture { path } => capture(&store_dir, &cfg, &path).await,
            CliCommand::Status => status(&store_dir, &cfg),
        }
    }
}

fn open_store(dir: &std::path::Path, cfg: &NetsnapConfig) -> Result<BoundedEntryStore<FileStore>> {
    let backend = FileStore::open(dir)
        .with_context(|| format!("open store directory: {}", dir.display()))?;
    Ok(BoundedEntryStore::with_config(backend, cfg))
}

fn parse_type(raw: &str) -> Result<TypeFilter> {
    TypeFilter::parse(raw).with_context(|| format!("unknown resource type filter: {}", raw))
}

async fn import(store_dir: &std::path::Path, cfg: &NetsnapConfig, path: &std::path::Path) -> Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read HAR file: {}", path.display()))?;
    let entries = parse_log(&bytes)?;
    if entries.is_empty() {
        bail!("HAR file has no entries");
    }
    let observed = entries.len();

    let store = open_store(store_dir, cfg)?;
    let handle = session::spawn(Coordinator::new(store, NoTabCapture, SELF_ID));

    // A fresh import is a fresh session: clear history, then save.
    handle
        .send(Envelope::new(SELF_ID, Request::SetDevtoolsOpen { open: true }))
        .await
        .context("coordinator dropped session-open request")?;

    let mut accumulator = EntryAccumulator::new(cfg.max_entries);
    accumulator.extend(entries);
    let response = handle
        .send(Envelope::new(
            SELF_ID,
            Request::SaveHarEntries {
                entries: accumulator.candidate(),
            },
        ))
        .await
        .context("coordinator dropped save request")?;

    match response {
        Response::Saved { ok: true, count } => {
            tracing::info!(observed, stored = count, "imported HAR file");
            println!("Imported {} of {} entries", count, observed);
            Ok(())
        }
        Response::Saved { ok: false, .. } => bail!("store rejected the entry batch"),
        other => bail!("unexpected response: {:?}", other),
    }
}

fn load_view(
    store_dir: &std::path::Path,
    cfg: &NetsnapConfig,
    type_raw: &str,
    text: Option<&str>,
) -> Result<ViewState> {
    let store = open_store(store_dir, cfg)?;
    let snapshot = store.load_snapshot()?;
    if snapshot.entries.is_empty() {
        bail!("no stored entries; run `netsnap import` first");
    }
    let mut view = ViewState::new(snapshot.entries, cfg.page_size);
    view.set_type_filter(parse_type(type_raw)?);
    if let Some(text) = text {
        view.set_text_filter(text);
    }
    Ok(view)
}

fn list(
    store_dir: &std::path::Path,
    cfg: &NetsnapConfig,
    type_raw: &str,
    text: Option<&str>,
    pages: usize,
) -> Result<()> {
    let mut view = load_view(store_dir, cfg, type_raw, text)?;
    for _ in 1..pages {
        if view.load_more() == 0 {
            break;
        }
    }

    for (position, entry) in view.visible_rows() {
        let status = entry.status();
        println!(
            "{:>5}  {:<7} {:<8} {:<9} {:>9} {:>9}  {}",
            position,
            entry.method(),
            status_class(status).as_str(),
            type_label(entry),
            format_size(entry.body_size()),
            format_time(entry.time),
            extract_path(entry.url()),
        );
    }
    println!(
        "{} of {} filtered entries shown{}",
        view.visible_len(),
        view.filtered_len(),
        if view.has_more() {
            " (rerun with --pages to see more)"
        } else {
            ""
        }
    );
    Ok(())
}

/// Parse `--select 0,2,5` into a de-duplicated position set. Repeating an
/// index selects it once rather than toggling it back off.
fn parse_selection(raw: &str, filtered_len: usize) -> Result<std::collections::BTreeSet<usize>> {
    let mut positions = std::collections::BTreeSet::new();
    for part in raw.split(',') {
        let position: usize = part
            .trim()
            .parse()
            .with_context(|| format!("invalid selection index: {:?}", part.trim()))?;
        if position >= filtered_len {
            bail!(
                "selection index {} out of range (filtered list has {} entries)",
                position,
                filtered_len
            );
        }
        positions.insert(position);
    }
    Ok(positions)
}

fn export(
    store_dir: &std::path::Path,
    cfg: &NetsnapConfig,
    all: bool,
    select: Option<&str>,
    type_raw: &str,
    text: Option<&str>,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let mut view = load_view(store_dir, cfg, type_raw, text)?;

    if all {
        view.select_all();
    } else if let Some(select) = select {
        for position in parse_selection(select, view.filtered_len())? {
            view.toggle(position);
        }
    } else {
        bail!("nothing selected; pass --all or --select");
    }

    let selected = view.selected_entries();
    if selected.is_empty() {
        bail!("selection is empty");
    }
    let count = selected.len();
    let doc = build_document(selected);
    let json = serde_json::to_string_pretty(&doc)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("write HAR export: {}", path.display()))?;
            println!("Exported {} entries to {}", count, path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn capture(store_dir: &std::path::Path, cfg: &NetsnapConfig, path: &std::path::Path) -> Result<()> {
    let store = open_store(store_dir, cfg)?;
    let handle = session::spawn(Coordinator::new(store, FileTabCapture::new(path), SELF_ID));

    let response = handle
        .send(Envelope::new(SELF_ID, Request::CaptureTab))
        .await
        .context("coordinator dropped capture request")?;

    match response {
        Response::Screenshot { data_url } => {
            println!("Captured screenshot ({} bytes as data URL)", data_url.len());
            Ok(())
        }
        Response::CaptureFailed { error } => bail!("capture failed: {}", error),
        other => bail!("unexpected response: {:?}", other),
    }
}

fn status(store_dir: &std::path::Path, cfg: &NetsnapConfig) -> Result<()> {
    let store = open_store(store_dir, cfg)?;
    let snapshot = store.load_snapshot()?;
    println!("Session active: {}", snapshot.devtools_open);
    println!(
        "Stored entries: {} ({} of {} bytes)",
        snapshot.entries.len(),
        store.persisted_bytes()?,
        store.capacity()
    );
    println!(
        "Screenshot: {}",
        match snapshot.screenshot.as_deref() {
            Some(url) if is_valid_screenshot_url(url) => "present",
            Some(_) => "invalid",
            None => "none",
        }
    );
    Ok(())
}
