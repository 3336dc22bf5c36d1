//! Full session flow through the spawned coordinator against the on-disk
//! store: open, save batches, capture, reload as the viewer would.

use std::io::Write;

use netsnap_core::config::NetsnapConfig;
use netsnap_core::har::{build_document, HarEntry};
use netsnap_core::session::{
    self, Envelope, EntryAccumulator, FileTabCapture, Request, Response,
};
use netsnap_core::store::{BoundedEntryStore, FileStore};
use netsnap_core::viewer::{TypeFilter, ViewState};
use tempfile::tempdir;

const SELF_ID: &str = "netsnap";

fn entry(index: usize, tag: &str) -> HarEntry {
    serde_json::from_str(&format!(
        r#"{{"request":{{"method":"GET","url":"https://example.com/api/{}","headers":[]}},
             "response":{{"status":200,"headers":[],"content":{{"size":10,"text":"aaaaaaaaaa"}}}},
             "time":5.0,"_resourceType":"{}"}}"#,
        index, tag
    ))
    .unwrap()
}

fn write_png(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("shot.png");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(&[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'])
        .unwrap();
    f.write_all(b"pixels").unwrap();
    path
}

#[tokio::test]
async fn capture_session_end_to_end() {
    let dir = tempdir().unwrap();
    let store_dir = dir.path().join("store");
    let png = write_png(dir.path());

    let cfg = NetsnapConfig::default();
    let backend = FileStore::open(&store_dir).unwrap();
    let store = BoundedEntryStore::with_config(backend, &cfg);
    let coordinator =
        session::Coordinator::new(store, FileTabCapture::new(&png), SELF_ID);
    let handle = session::spawn(coordinator);

    // Session opens: any prior state is gone, flag set.
    let response = handle
        .send(Envelope::new(SELF_ID, Request::SetDevtoolsOpen { open: true }))
        .await
        .unwrap();
    assert_eq!(response, Response::Ack { ok: true });

    // Producer observes traffic and saves the candidate snapshot.
    let mut accumulator = EntryAccumulator::new(cfg.max_entries);
    for i in 0..30 {
        accumulator.push(entry(i, if i % 2 == 0 { "xhr" } else { "script" }));
    }
    let response = handle
        .send(Envelope::new(
            SELF_ID,
            Request::SaveHarEntries {
                entries: accumulator.candidate(),
            },
        ))
        .await
        .unwrap();
    assert_eq!(response, Response::Saved { ok: true, count: 30 });

    // Screenshot capture goes through the same serialized loop.
    let response = handle
        .send(Envelope::new(SELF_ID, Request::CaptureTab))
        .await
        .unwrap();
    let data_url = match response {
        Response::Screenshot { data_url } => data_url,
        other => panic!("expected screenshot, got {:?}", other),
    };
    assert!(data_url.starts_with("data:image/png;base64,"));

    // Session closes; history must survive for the viewer.
    handle
        .send(Envelope::new(SELF_ID, Request::SetDevtoolsOpen { open: false }))
        .await
        .unwrap();

    // Viewer startup: snapshot read of all three keys.
    let reader = BoundedEntryStore::with_config(FileStore::open(&store_dir).unwrap(), &cfg);
    let snapshot = reader.load_snapshot().unwrap();
    assert_eq!(snapshot.entries.len(), 30);
    assert!(!snapshot.devtools_open);
    assert_eq!(snapshot.screenshot.as_deref(), Some(data_url.as_str()));
    // Bodies were stripped before persistence.
    assert!(snapshot.entries.iter().all(|e| {
        e.response
            .as_ref()
            .and_then(|r| r.content.as_ref())
            .map(|c| c.text.is_none())
            .unwrap_or(true)
    }));

    // Filter, select, export.
    let mut view = ViewState::new(snapshot.entries, cfg.page_size);
    view.set_type_filter(TypeFilter::FetchXhr);
    assert_eq!(view.filtered_len(), 15);
    view.select_all();
    let doc = build_document(view.selected_entries());
    assert_eq!(doc.log.version, "1.2");
    assert_eq!(doc.log.entries.len(), 15);
}

#[tokio::test]
async fn reopening_session_discards_history() {
    let dir = tempdir().unwrap();
    let store_dir = dir.path().join("store");
    let png = write_png(dir.path());

    let cfg = NetsnapConfig::default();
    let store = BoundedEntryStore::with_config(FileStore::open(&store_dir).unwrap(), &cfg);
    let handle = session::spawn(session::Coordinator::new(
        store,
        FileTabCapture::new(&png),
        SELF_ID,
    ));

    handle
        .send(Envelope::new(SELF_ID, Request::SetDevtoolsOpen { open: true }))
        .await
        .unwrap();
    handle
        .send(Envelope::new(
            SELF_ID,
            Request::SaveHarEntries {
                entries: (0..5).map(|i| entry(i, "xhr")).collect(),
            },
        ))
        .await
        .unwrap();
    handle
        .send(Envelope::new(SELF_ID, Request::CaptureTab))
        .await
        .unwrap();

    // Fresh session: empty history, screenshot gone, flag active.
    handle
        .send(Envelope::new(SELF_ID, Request::SetDevtoolsOpen { open: true }))
        .await
        .unwrap();

    let reader = BoundedEntryStore::with_config(FileStore::open(&store_dir).unwrap(), &cfg);
    let snapshot = reader.load_snapshot().unwrap();
    assert!(snapshot.entries.is_empty());
    assert!(snapshot.screenshot.is_none());
    assert!(snapshot.devtools_open);
}
