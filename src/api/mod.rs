//! Sheet splitter backend API abstraction layer.
//!
//! This module defines the `SplitterApi` trait, which is the sole interface
//! for all HTTP interactions with the backend. All network requests MUST be
//! implemented within the `api/` directory. Upper-layer modules (`services/`)
//! call through this trait and never construct HTTP requests directly, so a
//! backend API change only touches this module.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::signals::ProgressCell;

/// Fallback name used when the split response carries no usable
/// attachment-disposition filename hint.
pub const FALLBACK_DOWNLOAD_NAME: &str = "download";

/// Input for a single-file upload.
#[derive(Debug)]
pub struct UploadParams {
    /// Raw file bytes, sent as one multipart part named `file`.
    pub data: Vec<u8>,
    pub file_name: String,
    /// Raised to the headers milestone once the response arrives.
    pub progress: ProgressCell,
}

/// Successful upload response body.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub temp_file: String,
    pub filename: String,
    /// Discovered sheet names in workbook order.
    pub sheets: Vec<String>,
}

/// JSON body of the split request. Field names are the backend wire contract;
/// `sheets` holds the currently selected names in sheet order.
#[derive(Debug, Clone, Serialize)]
pub struct SplitRequest {
    pub session_id: String,
    pub temp_file: String,
    pub filename: String,
    pub sheets: Vec<String>,
}

/// Input for a split call.
#[derive(Debug)]
pub struct SplitParams {
    pub request: SplitRequest,
    /// Raised to the headers milestone once the response arrives.
    pub progress: ProgressCell,
}

/// Successful split result: the packaged file plus its resolved name.
#[derive(Debug, Clone)]
pub struct SplitPayload {
    /// Name from the attachment-disposition hint, or the generic fallback.
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Abstraction trait for backend interactions.
///
/// The current implementation is `SplitterApiV1`. When the backend API
/// changes, a new implementation can be swapped in without affecting the
/// workflow controller.
pub trait SplitterApi: Send + Sync {
    /// Upload a spreadsheet and discover its sheets.
    ///
    /// A 2xx response yields the session identifiers and the sheet list;
    /// a non-2xx response surfaces the backend's `error` field as
    /// `AppError::Upload`.
    fn upload(
        &self,
        params: UploadParams,
    ) -> impl std::future::Future<Output = std::result::Result<UploadResponse, AppError>> + Send;

    /// Request a re-packaged file containing only the selected sheets.
    ///
    /// A 2xx response yields the binary payload plus the filename hint;
    /// a non-2xx response surfaces the backend's `error` field as
    /// `AppError::Split`.
    fn split(
        &self,
        params: SplitParams,
    ) -> impl std::future::Future<Output = std::result::Result<SplitPayload, AppError>> + Send;
}

pub mod v1;
