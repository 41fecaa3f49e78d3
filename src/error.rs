//! Error types shared across the crate.
//!
//! Every failure surfaced to a caller is an `AppError`. The `Validation`,
//! `EmptySelection`, `Upload` and `Split` variants carry the exact text shown
//! to the user; transport and I/O failures keep their source error and are
//! mapped to a generic user message by the workflow controller.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Candidate file rejected before any network interaction.
    #[error("{0}")]
    Validation(String),

    /// Split requested with no sheets selected.
    #[error("select at least one sheet to split")]
    EmptySelection,

    /// A network operation is already in flight; the trigger is rejected.
    #[error("another operation is already in progress")]
    Busy,

    /// Upload rejected by the backend; carries the backend-provided message.
    #[error("{0}")]
    Upload(String),

    /// Split rejected by the backend; carries the backend-provided message.
    #[error("{0}")]
    Split(String),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}
