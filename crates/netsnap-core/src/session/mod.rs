//! Capture session coordination.
//!
//! One consumer task multiplexes three request kinds (entry batch save,
//! screenshot capture, session open/close) onto the store and the host
//! capture seam, answering each accepted request exactly once. Untrusted
//! senders get no answer at all.

mod accumulator;
mod capture;
mod coordinator;
mod request;

pub use accumulator::EntryAccumulator;
pub use capture::{
    is_valid_screenshot_url, FileTabCapture, NoTabCapture, TabCapture, PNG_DATA_URL_PREFIX,
};
pub use coordinator::{spawn, Coordinator, CoordinatorHandle, SessionState};
pub use request::{Envelope, Request, Response};
