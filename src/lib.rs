//! Client-side workflow for the Excel sheet splitter service.
//!
//! The crate sequences the full lifecycle — upload, sheet discovery,
//! selection, split, download, reset — against a remote splitter backend,
//! and reports progress, errors and successes through observable signals.
//! Presentation is left to the embedding shell: wire a [`signals::SignalSink`]
//! to render state and call the [`services::workflow::WorkflowController`]
//! methods from UI events.

pub mod api;
pub mod error;
pub mod models;
pub mod services;
pub mod signals;
pub mod storage;

pub use api::v1::SplitterApiV1;
pub use error::{AppError, Result};
pub use services::workflow::WorkflowController;
