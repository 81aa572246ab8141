//! JSON file-based document store.
//!
//! This module provides a local, human-readable [`DocumentStore`] that behaves
//! like the real-time database the UI was built against: documents live in
//! named collections, ids and ordering timestamps are assigned by the store,
//! and every subscriber receives a full ordered snapshot after each change.
//! Writes are atomic (write-to-temp + rename) to prevent corruption on crashes.
//!
//! # Performance Characteristics
//!
//! - **Read**: loads the entire file into memory once
//! - **Write**: serializes and writes the entire dataset
//! - **Best for**: personal drives with a few thousand documents

use crate::domain::error::{DriveError, Result};
use crate::store::backend::DocumentStore;
use crate::store::models::{Document, DocumentFields, SnapshotEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

/// On-disk container format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    /// Version of the storage format for future migrations.
    version: u32,

    /// Last timestamp handed out, kept so ordering survives restarts.
    #[serde(default)]
    last_timestamp: i64,

    /// Collections keyed by name, each mapping document id to fields.
    #[serde(default)]
    collections: HashMap<String, HashMap<String, DocumentFields>>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: 1,
            last_timestamp: 0,
            collections: HashMap::new(),
        }
    }
}

/// A live subscription to one collection.
struct Subscriber {
    collection: String,
    sender: Sender<SnapshotEvent>,
}

/// JSON file document store.
///
/// The dataset is kept in memory and persisted on every modification.
///
/// # Thread Safety
///
/// This type is `Send` but not `Sync`. It is owned by the worker thread, which
/// runs store commands one at a time.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "last_timestamp": 1709281800000,
///   "collections": {
///     "myFiles": {
///       "5f0c...": {
///         "name": "Report.pdf",
///         "type": "application/pdf",
///         "size": 2048,
///         "data": "data:application/pdf;base64,...",
///         "uploadDate": "2024-03-01T08:30:00.000Z",
///         "timestamp": 1709281800000
///       }
///     }
///   }
/// }
/// ```
pub struct JsonDocumentStore {
    file_path: PathBuf,
    data: StoreData,
    dirty: bool,
    subscribers: Vec<Subscriber>,
}

impl JsonDocumentStore {
    /// Creates or opens a JSON document store.
    ///
    /// Loads existing data if the file exists; parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - The file exists but contains invalid JSON
    /// - File permissions prevent reading
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON document store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty store");
            StoreData::default()
        };

        tracing::debug!(
            collection_count = data.collections.len(),
            "document store initialized"
        );

        Ok(Self {
            file_path,
            data,
            dirty: false,
            subscribers: Vec::new(),
        })
    }

    fn load_from_file(path: &Path) -> Result<StoreData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StoreData = serde_json::from_str(&contents)
            .map_err(|e| DriveError::Store(format!("failed to parse JSON: {e}")))?;

        tracing::debug!(
            version = data.version,
            collections = data.collections.len(),
            "loaded store data"
        );

        Ok(data)
    }

    /// Saves the dataset using write-to-temp + rename.
    fn save_to_file(&mut self) -> Result<()> {
        if !self.dirty {
            tracing::trace!("skipping save, no changes");
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| DriveError::Store(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        self.dirty = false;
        tracing::debug!(path = ?self.file_path, "store saved");
        Ok(())
    }

    /// Returns a strictly increasing server timestamp in milliseconds.
    fn next_timestamp(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let timestamp = now.max(self.data.last_timestamp.saturating_add(1));
        self.data.last_timestamp = timestamp;
        timestamp
    }

    /// Collection contents ordered by timestamp descending, ties by id.
    fn ordered(&self, collection: &str) -> Vec<Document> {
        let mut documents: Vec<Document> = self
            .data
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        documents.sort_by(|a, b| {
            b.fields
                .timestamp
                .cmp(&a.fields.timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });
        documents
    }

    /// Sends a fresh snapshot to every subscriber of `collection`.
    ///
    /// Subscribers whose receiving end has been dropped are removed.
    fn broadcast(&mut self, collection: &str) {
        let documents = self.ordered(collection);
        let before = self.subscribers.len();

        self.subscribers.retain(|subscriber| {
            subscriber.collection != collection
                || subscriber
                    .sender
                    .send(SnapshotEvent::Documents(documents.clone()))
                    .is_ok()
        });

        tracing::debug!(
            collection = %collection,
            document_count = documents.len(),
            dropped_subscribers = before - self.subscribers.len(),
            "snapshot broadcast"
        );
    }
}

impl DocumentStore for JsonDocumentStore {
    fn subscribe(&mut self, collection: &str) -> Result<Receiver<SnapshotEvent>> {
        let _span = tracing::debug_span!("json_subscribe", collection = %collection).entered();

        let (sender, receiver) = mpsc::channel();
        sender
            .send(SnapshotEvent::Documents(self.ordered(collection)))
            .map_err(|e| DriveError::Subscription(e.to_string()))?;

        self.subscribers.push(Subscriber {
            collection: collection.to_string(),
            sender,
        });

        tracing::debug!(subscriber_count = self.subscribers.len(), "subscriber added");
        Ok(receiver)
    }

    fn create_document(&mut self, collection: &str, fields: &DocumentFields) -> Result<String> {
        let _span = tracing::debug_span!("json_create_document",
            collection = %collection,
            name = %fields.name,
            size = fields.size
        ).entered();

        let id = uuid::Uuid::new_v4().to_string();
        let previous_timestamp = self.data.last_timestamp;
        let mut stored = fields.clone();
        stored.timestamp = Some(self.next_timestamp());

        self.data
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), stored);
        self.dirty = true;

        if let Err(e) = self.save_to_file() {
            if let Some(docs) = self.data.collections.get_mut(collection) {
                docs.remove(&id);
            }
            self.data.last_timestamp = previous_timestamp;
            self.dirty = false;
            return Err(e);
        }

        self.broadcast(collection);
        tracing::debug!(document_id = %id, "document created");
        Ok(id)
    }

    fn delete_document(&mut self, collection: &str, id: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_delete_document",
            collection = %collection,
            document_id = %id
        ).entered();

        let removed = self
            .data
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));

        let Some(fields) = removed else {
            tracing::debug!("document already absent");
            return Ok(());
        };

        self.dirty = true;
        if let Err(e) = self.save_to_file() {
            self.data
                .collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), fields);
            self.dirty = false;
            return Err(e);
        }

        self.broadcast(collection);
        tracing::debug!("document deleted");
        Ok(())
    }

    fn list_documents(&self, collection: &str) -> Result<Vec<Document>> {
        let documents = self.ordered(collection);
        tracing::debug!(collection = %collection, count = documents.len(), "listed documents");
        Ok(documents)
    }
}

impl Drop for JsonDocumentStore {
    fn drop(&mut self) {
        if self.dirty {
            tracing::debug!("saving dirty data on drop");
            if let Err(e) = self.save_to_file() {
                tracing::error!(error = %e, "failed to save on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    const COLLECTION: &str = "myFiles";

    fn fields(name: &str) -> DocumentFields {
        DocumentFields::for_upload(name, "text/plain", 3, "data:text/plain;base64,YWJj".into(), Utc::now())
    }

    fn open(dir: &TempDir) -> JsonDocumentStore {
        JsonDocumentStore::new(dir.path().join("drive.json")).unwrap()
    }

    fn ids(documents: &[Document]) -> Vec<String> {
        documents.iter().map(|d| d.id.clone()).collect()
    }

    #[test]
    fn lists_newest_first() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);

        let first = store.create_document(COLLECTION, &fields("first.txt")).unwrap();
        let second = store.create_document(COLLECTION, &fields("second.txt")).unwrap();

        let documents = store.list_documents(COLLECTION).unwrap();
        assert_eq!(ids(&documents), vec![second, first]);
        assert!(documents.iter().all(|d| d.fields.timestamp.is_some()));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let id = {
            let mut store = open(&dir);
            store.create_document(COLLECTION, &fields("kept.txt")).unwrap()
        };

        let store = open(&dir);
        let documents = store.list_documents(COLLECTION).unwrap();
        assert_eq!(ids(&documents), vec![id]);
        assert_eq!(documents[0].fields.name, "kept.txt");
    }

    #[test]
    fn subscribers_get_initial_and_change_snapshots() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        let snapshots = store.subscribe(COLLECTION).unwrap();

        assert_eq!(snapshots.try_recv().unwrap(), SnapshotEvent::Documents(vec![]));

        let id = store.create_document(COLLECTION, &fields("a.txt")).unwrap();
        match snapshots.try_recv().unwrap() {
            SnapshotEvent::Documents(docs) => assert_eq!(ids(&docs), vec![id.clone()]),
            SnapshotEvent::Failed(e) => panic!("unexpected failure: {e}"),
        }

        store.delete_document(COLLECTION, &id).unwrap();
        assert_eq!(snapshots.try_recv().unwrap(), SnapshotEvent::Documents(vec![]));
    }

    #[test]
    fn other_collections_are_not_broadcast() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        let snapshots = store.subscribe("other").unwrap();
        let _ = snapshots.try_recv();

        store.create_document(COLLECTION, &fields("a.txt")).unwrap();
        assert!(snapshots.try_recv().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        drop(store.subscribe(COLLECTION).unwrap());

        store.create_document(COLLECTION, &fields("a.txt")).unwrap();
        assert!(store.subscribers.is_empty());
    }

    #[test]
    fn deleting_missing_document_succeeds() {
        let dir = TempDir::new().unwrap();
        let mut store = open(&dir);
        assert!(store.delete_document(COLLECTION, "missing").is_ok());
    }

    #[test]
    fn rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("drive.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(JsonDocumentStore::new(path), Err(DriveError::Store(_))));
    }
}
