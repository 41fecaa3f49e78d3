//! Local persistence layer.
//!
//! The only persistence this client performs is writing split results to
//! disk. The `DownloadSink` trait keeps the save mechanism swappable (a UI
//! shell may route it through a native save dialog instead).

pub mod downloads;
