//! Observable signals for the presentation layer.
//!
//! The workflow controller reports everything a UI needs to render —
//! phase changes, progress, messages, discovered sheets, selection counts
//! and saved downloads — through the object-safe [`SignalSink`] trait.
//! The crate ships a logging sink and an mpsc channel sink; a UI shell can
//! provide its own.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::models::sheet::SheetEntry;
use crate::models::workflow::WorkflowPhase;

/// Synthetic progress milestones.
///
/// The transport does not report incremental bytes, so progress is a small
/// fixed sequence of coarse markers rather than measured transfer progress.
pub mod milestone {
    /// Marker set when an operation starts, before the request is sent.
    pub const STARTED: u8 = 10;
    /// Marker set once the upload response headers are available.
    pub const UPLOAD_HEADERS: u8 = 50;
    /// Marker set once the split response headers are available.
    pub const SPLIT_HEADERS: u8 = 80;
    /// Terminal marker once the result has been fully processed.
    pub const DONE: u8 = 100;
}

/// Current user-visible message. Success and error messages are mutually
/// exclusive; each new message replaces the prior one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "text")]
pub enum StatusMessage {
    Error(String),
    Success(String),
}

impl StatusMessage {
    pub fn text(&self) -> &str {
        match self {
            StatusMessage::Error(text) | StatusMessage::Success(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StatusMessage::Error(_))
    }
}

/// A single observable state change emitted by the workflow controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "payload")]
pub enum WorkflowSignal {
    Phase(WorkflowPhase),
    /// Progress value in [0, 100].
    Progress(u8),
    /// `None` means the message area was cleared.
    Message(Option<StatusMessage>),
    /// Sheet list discovered by a successful upload, in backend order.
    SheetsDiscovered(Vec<SheetEntry>),
    SelectionChanged {
        selected: usize,
        total: usize,
    },
    /// A split result was written to disk.
    DownloadSaved {
        file_name: String,
        path: PathBuf,
    },
}

/// Receiver for workflow signals. Implementations must be cheap and
/// non-blocking; emission happens inside the controller's critical sections.
pub trait SignalSink: Send + Sync {
    fn emit(&self, signal: WorkflowSignal);
}

/// Sink that writes every signal to the log. Useful as a default when no UI
/// is attached.
pub struct LogSink;

impl SignalSink for LogSink {
    fn emit(&self, signal: WorkflowSignal) {
        log::debug!("workflow signal: {:?}", signal);
    }
}

/// Sink that forwards signals into an unbounded mpsc channel. Send failures
/// (receiver dropped) are ignored; a detached UI must not fail the workflow.
pub struct ChannelSink {
    tx: tokio::sync::mpsc::UnboundedSender<WorkflowSignal>,
}

impl ChannelSink {
    pub fn new(tx: tokio::sync::mpsc::UnboundedSender<WorkflowSignal>) -> Self {
        Self { tx }
    }
}

impl SignalSink for ChannelSink {
    fn emit(&self, signal: WorkflowSignal) {
        let _ = self.tx.send(signal);
    }
}

/// Shared progress value that emits a [`WorkflowSignal::Progress`] on every
/// change.
///
/// The cell is handed to the API layer so the headers milestone can be raised
/// while the response body is still being read, without the API layer knowing
/// anything else about workflow state.
#[derive(Clone)]
pub struct ProgressCell {
    value: Arc<AtomicU8>,
    sink: Arc<dyn SignalSink>,
}

impl ProgressCell {
    pub fn new(sink: Arc<dyn SignalSink>) -> Self {
        Self {
            value: Arc::new(AtomicU8::new(0)),
            sink,
        }
    }

    pub fn set(&self, value: u8) {
        self.value.store(value, Ordering::Relaxed);
        self.sink.emit(WorkflowSignal::Progress(value));
    }

    pub fn get(&self) -> u8 {
        self.value.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ProgressCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressCell")
            .field("value", &self.get())
            .finish()
    }
}
