//! Document store abstraction.
//!
//! This module defines the [`DocumentStore`] trait, the only contract the core
//! consumes from the external real-time database: subscribe to an ordered
//! collection, create a document, delete a document.
//!
//! # Design
//!
//! The trait is minimal and maps one-to-one onto the commands issued by the
//! worker thread. Change notifications are delivered over a channel so the
//! session loop can consume them like any other inbound event.

use crate::domain::error::Result;
use crate::store::models::{Document, DocumentFields, SnapshotEvent};
use std::sync::mpsc::Receiver;

/// Abstraction over real-time document store backends.
///
/// # Implementations
///
/// - [`JsonDocumentStore`](crate::store::JsonDocumentStore): JSON file with atomic writes
///
/// # Examples
///
/// ```no_run
/// use drivedeck::store::{DocumentStore, JsonDocumentStore};
/// use std::path::PathBuf;
///
/// let mut store = JsonDocumentStore::new(PathBuf::from("/tmp/drive.json"))?;
/// let snapshots = store.subscribe("myFiles")?;
/// # Ok::<(), drivedeck::DriveError>(())
/// ```
pub trait DocumentStore: Send {
    /// Subscribes to a collection ordered by `timestamp` descending.
    ///
    /// The current contents are delivered immediately, then a full snapshot is
    /// sent after every change to the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription cannot be established.
    fn subscribe(&mut self, collection: &str) -> Result<Receiver<SnapshotEvent>>;

    /// Creates a document and returns its store-assigned id.
    ///
    /// The store assigns `timestamp`, ignoring any value in `fields`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    fn create_document(&mut self, collection: &str, fields: &DocumentFields) -> Result<String>;

    /// Deletes a document. Deleting an id that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete is rejected.
    fn delete_document(&mut self, collection: &str, id: &str) -> Result<()>;

    /// Returns the collection ordered by `timestamp` descending.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn list_documents(&self, collection: &str) -> Result<Vec<Document>>;
}
