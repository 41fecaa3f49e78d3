//! Business logic layer.
//!
//! This module contains the core logic of the client: candidate file
//! validation and the workflow controller that sequences upload, selection,
//! split and reset. It delegates HTTP interactions to the `api` layer and
//! download persistence to the `storage` layer.

pub mod validator;
pub mod workflow;
