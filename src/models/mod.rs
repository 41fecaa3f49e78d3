//! Data models for the sheet splitter client.
//!
//! This module contains shared data structure definitions used across the
//! crate: candidate file entries, the upload session, sheet selection state,
//! the workflow phase, and client settings.

pub mod file;
pub mod session;
pub mod settings;
pub mod sheet;
pub mod workflow;
