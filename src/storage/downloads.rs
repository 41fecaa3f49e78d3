//! Saving split results to disk.

use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Destination for a downloaded split result.
///
/// Invoked exactly once per successful split, with the exact bytes received
/// from the backend. Implementations must be callable from a blocking
/// context; the controller runs them through `spawn_blocking`.
pub trait DownloadSink: Send + Sync {
    fn save(&self, file_name: &str, data: Vec<u8>) -> crate::error::Result<PathBuf>;
}

/// Sink that writes downloads into a fixed directory.
pub struct DiskSink {
    dir: PathBuf,
}

impl DiskSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DiskSink {
    fn save(&self, file_name: &str, data: Vec<u8>) -> crate::error::Result<PathBuf> {
        // The name comes from a server header; strip any path components so
        // it cannot escape the download directory.
        let name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AppError::Internal(format!("unusable download file name: {}", file_name))
            })?;

        std::fs::create_dir_all(&self.dir)?;
        let path = unique_path(&self.dir, name);
        std::fs::write(&path, &data)?;
        Ok(path)
    }
}

/// Resolve name collisions as `name(1).ext`, `name(2).ext`, ...
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    let mut counter = 1;
    loop {
        let numbered = match ext {
            Some(ext) => format!("{}({}).{}", stem, counter, ext),
            None => format!("{}({})", name, counter),
        };
        let candidate = dir.join(numbered);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
