//! Upload session model.

use serde::Serialize;

/// Correlation data issued by the backend on a successful upload.
///
/// All fields are opaque to the client and are passed back verbatim on the
/// split request. Exactly one session exists at a time; it is owned by the
/// workflow controller and destroyed on reset or when a new upload begins.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub temp_file: String,
    pub filename: String,
    /// Sheet names discovered by the backend, in backend order.
    pub sheets: Vec<String>,
}
