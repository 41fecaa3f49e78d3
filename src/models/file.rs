//! Candidate file model for upload.

use std::path::Path;

use crate::error::AppError;

/// A candidate spreadsheet file picked by the user.
///
/// `content_type` is the declared MIME type if the picker provides one; it is
/// optional because type metadata is unreliable across platforms, and the
/// validator accepts a file on either extension or declared type.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl FileEntry {
    /// Build an entry from a path on disk, reading the size from metadata.
    /// The declared content type is left empty; callers that know it can set
    /// it afterwards.
    pub fn from_path(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AppError::Internal(format!("path has no usable file name: {}", path.display()))
            })?
            .to_string();
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            file_name,
            file_path: path.to_string_lossy().to_string(),
            file_size: metadata.len(),
            content_type: None,
        })
    }
}
