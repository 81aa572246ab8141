//! Store layer: the document database contract and its local implementation.
//!
//! # Modules
//!
//! - `backend`: [`DocumentStore`] trait consumed by the worker
//! - `json`: JSON file-based store with snapshot broadcast
//! - `models`: Wire-level document types, separate from domain records

pub mod backend;
pub mod json;
pub mod models;

pub use backend::DocumentStore;
pub use json::JsonDocumentStore;
pub use models::{Document, DocumentFields, SnapshotEvent};
