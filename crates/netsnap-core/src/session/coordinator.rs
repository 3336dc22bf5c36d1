//! The capture coordinator: session state machine plus request dispatch.
//!
//! A single consumer owns the store, so writes are fully serialized; no two
//! save requests can race past it. Every accepted request gets exactly one
//! response. Envelopes from any other sender are dropped without a reply,
//! which callers observe as a closed response channel.

use tokio::sync::{mpsc, oneshot};

use crate::har::HarEntry;
use crate::store::{BoundedEntryStore, KvStore};

use super::capture::TabCapture;
use super::request::{Envelope, Request, Response};

/// Capture session state. `Active` means entries are accumulating; the
/// transition into `Active` wipes all persisted history first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Active,
}

pub struct Coordinator<S: KvStore, C: TabCapture> {
    store: BoundedEntryStore<S>,
    capture: C,
    trusted_sender: String,
    state: SessionState,
}

impl<S: KvStore, C: TabCapture> Coordinator<S, C> {
    pub fn new(store: BoundedEntryStore<S>, capture: C, trusted_sender: impl Into<String>) -> Self {
        Self {
            store,
            capture,
            trusted_sender: trusted_sender.into(),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Dispatch one request. `None` means the envelope was dropped without a
    /// response (untrusted sender); that is deliberately distinct from an
    /// error response.
    pub fn handle(&mut self, envelope: Envelope) -> Option<Response> {
        if envelope.sender != self.trusted_sender {
            tracing::debug!(sender = %envelope.sender, "dropping request from untrusted sender");
            return None;
        }
        let response = match envelope.request {
            Request::SaveHarEntries { entries } => self.handle_save(&entries),
            Request::CaptureTab => self.handle_capture(),
            Request::SetDevtoolsOpen { open } => self.handle_session_flag(open),
        };
        Some(response)
    }

    fn handle_save(&mut self, entries: &[HarEntry]) -> Response {
        // An empty candidate is invalid producer input; reject before the
        // truncation algorithm runs.
        if entries.is_empty() {
            return Response::Saved { ok: false, count: 0 };
        }
        match self.store.save_entries(entries) {
            Ok(count) => Response::Saved { ok: true, count },
            Err(err) => {
                tracing::error!(error = %err, "entry persistence failed");
                Response::Saved { ok: false, count: 0 }
            }
        }
    }

    fn handle_capture(&mut self) -> Response {
        let data_url = match self.capture.capture_visible_tab() {
            Ok(url) => url,
            Err(err) => {
                return Response::CaptureFailed {
                    error: format!("{:#}", err),
                }
            }
        };
        // Persisting the screenshot is best effort; the caller gets the
        // captured image either way.
        if let Err(err) = self.store.set_screenshot(&data_url) {
            tracing::warn!(error = %err, "screenshot not persisted");
        }
        Response::Screenshot { data_url }
    }

    fn handle_session_flag(&mut self, open: bool) -> Response {
        let result = if open {
            self.state = SessionState::Active;
            self.store.open_session()
        } else {
            self.state = SessionState::Idle;
            self.store.close_session()
        };
        // The flag change is acknowledged even when the store write fails;
        // the caller has nothing useful to do with the failure.
        if let Err(err) = result {
            tracing::warn!(error = %err, open, "session flag not persisted");
        }
        Response::Ack { ok: true }
    }

    /// Read access for the viewer; all mutation stays inside `handle`.
    pub fn store(&self) -> &BoundedEntryStore<S> {
        &self.store
    }
}

/// Client handle to a spawned coordinator task.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<(Envelope, oneshot::Sender<Response>)>,
}

impl CoordinatorHandle {
    /// Send one request and wait for its response. `None` means the
    /// coordinator dropped the request (untrusted sender) or has shut down.
    pub async fn send(&self, envelope: Envelope) -> Option<Response> {
        let (respond, rx) = oneshot::channel();
        self.tx.send((envelope, respond)).await.ok()?;
        rx.await.ok()
    }
}

/// Run a coordinator on its own task, serializing all requests through one
/// mpsc receiver. The task ends when every handle is dropped.
pub fn spawn<S, C>(mut coordinator: Coordinator<S, C>) -> CoordinatorHandle
where
    S: KvStore + Send + 'static,
    C: TabCapture + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<(Envelope, oneshot::Sender<Response>)>(32);
    tokio::spawn(async move {
        while let Some((envelope, respond)) = rx.recv().await {
            match coordinator.handle(envelope) {
                // A closed receiver just means the caller went away.
                Some(response) => {
                    let _ = respond.send(response);
                }
                // Dropping the responder closes the caller's channel with no
                // response sent.
                None => drop(respond),
            }
        }
    });
    CoordinatorHandle { tx }
}
