//! Candidate file validation.
//!
//! Runs entirely locally, before any network interaction. A file is accepted
//! when its extension OR its declared content type identifies a spreadsheet
//! (type metadata is unreliable across platforms, so either is sufficient)
//! and its size does not exceed the upload limit.

use crate::error::AppError;
use crate::models::file::FileEntry;

/// Maximum accepted upload size: 30 MiB.
pub const MAX_FILE_SIZE: u64 = 30 * 1024 * 1024;

/// Accepted file extensions, lowercase, without the dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Content types recognized as spreadsheets.
const SPREADSHEET_CONTENT_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];

fn has_allowed_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn has_spreadsheet_content_type(entry: &FileEntry) -> bool {
    entry
        .content_type
        .as_deref()
        .map(|t| SPREADSHEET_CONTENT_TYPES.contains(&t))
        .unwrap_or(false)
}

/// Validate a candidate file. Returns `AppError::Validation` with a
/// user-visible message on rejection.
pub fn validate(entry: &FileEntry) -> crate::error::Result<()> {
    if !has_allowed_extension(&entry.file_name) && !has_spreadsheet_content_type(entry) {
        return Err(AppError::Validation(
            "only XLSX or XLS files can be uploaded".to_string(),
        ));
    }
    if entry.file_size > MAX_FILE_SIZE {
        return Err(AppError::Validation(
            "file exceeds the 30 MB size limit".to_string(),
        ));
    }
    Ok(())
}
