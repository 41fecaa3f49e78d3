//! Workflow phase of the split lifecycle.

use serde::Serialize;

/// Current phase of the upload/split workflow.
///
/// `Ready` implies a live session and a non-empty sheet list. Errors do not
/// get their own phase: a failure returns the workflow to the last valid
/// phase (`Idle` after an upload failure, `Ready` after a split failure) and
/// the error text is carried by the current status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowPhase {
    #[default]
    Idle,
    Uploading,
    Ready,
    Splitting,
}

impl WorkflowPhase {
    /// True while a network operation is in flight. All mutating triggers are
    /// rejected in a busy phase; this is the sole concurrency guard.
    pub fn is_busy(self) -> bool {
        matches!(self, WorkflowPhase::Uploading | WorkflowPhase::Splitting)
    }
}
