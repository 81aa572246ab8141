//! Worker thread implementation for store commands and file encoding.
//!
//! File reads, base64 encoding and store writes all run here, off the session
//! loop, so a large upload never blocks snapshot processing or rendering.

use crate::domain::error::{DriveError, Result};
use crate::domain::payload::encode_data_url;
use crate::infrastructure::{file_name_of, guess_mime_type};
use crate::store::{DocumentFields, DocumentStore};
use crate::worker::{WorkerMessage, WorkerResponse};
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

/// Worker state: the store backend and the collection it writes to.
///
/// The worker is the only owner of the store once a session starts, so store
/// commands are applied strictly in the order they were posted.
pub struct DriveWorker {
    /// Backend receiving create and delete commands.
    store: Box<dyn DocumentStore>,
    /// Collection every command targets.
    collection: String,
}

impl DriveWorker {
    /// Creates a worker.
    ///
    /// # Parameters
    ///
    /// * `store` - Document store; moved onto the worker thread by [`spawn_worker`]
    /// * `collection` - Collection name, e.g. `myFiles`
    pub fn new(store: Box<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Standardizes logging for store and encoding results.
    ///
    /// # Parameters
    ///
    /// * `operation` - Name used in log lines and in the error message
    /// * `result` - Outcome of the operation
    /// * `on_success` - Builds the response from the success value
    /// * `on_error` - Builds the response from `"<operation>: <error>"`
    ///
    /// # Returns
    ///
    /// The response built by whichever callback matches `result`.
    fn handle_store_result<T, S, E>(
        operation: &str,
        result: Result<T>,
        on_success: S,
        on_error: E,
    ) -> WorkerResponse
    where
        S: FnOnce(T) -> WorkerResponse,
        E: FnOnce(String) -> WorkerResponse,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation = operation, "store operation successful");
                on_success(value)
            }
            Err(e) => {
                tracing::warn!(operation = operation, error = %e, "store operation failed");
                on_error(format!("{operation}: {e}"))
            }
        }
    }

    /// Reads a file from disk and builds its document fields.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Io`] if the file cannot be read.
    pub fn encode_file(path: &Path) -> Result<DocumentFields> {
        let bytes = std::fs::read(path)?;
        let mime_type = guess_mime_type(path);
        let size = bytes.len() as u64;

        tracing::debug!(path = %path.display(), size, mime_type = %mime_type, "encoding file");

        let data = encode_data_url(&mime_type, &bytes);
        Ok(DocumentFields::for_upload(
            file_name_of(path),
            mime_type,
            size,
            data,
            chrono::Utc::now(),
        ))
    }

    /// Encodes a queued file, tagging the response with its batch slot.
    fn handle_encode_file(batch: u64, index: usize, path: &Path) -> WorkerResponse {
        Self::handle_store_result(
            "encode file",
            Self::encode_file(path),
            |fields| WorkerResponse::FileEncoded { batch, index, fields },
            |message| WorkerResponse::UploadFailed { batch, index, message },
        )
    }

    /// Writes an encoded file. Any store error fails the whole batch.
    fn handle_create_document(&mut self, batch: u64, index: usize, fields: &DocumentFields) -> WorkerResponse {
        Self::handle_store_result(
            "create document",
            self.store.create_document(&self.collection, fields),
            |id| {
                tracing::debug!(file_id = %id, name = %fields.name, "document created");
                WorkerResponse::DocumentCreated { batch, index, id }
            },
            |message| WorkerResponse::UploadFailed { batch, index, message },
        )
    }

    /// Deletes a binned document. A missing document counts as deleted.
    fn handle_delete_document(&mut self, id: String) -> WorkerResponse {
        match self.store.delete_document(&self.collection, &id) {
            Ok(()) => {
                tracing::debug!(file_id = %id, "document deleted");
                WorkerResponse::DocumentDeleted { id }
            }
            Err(e) => {
                tracing::warn!(file_id = %id, error = %e, "delete document failed");
                WorkerResponse::DeleteFailed {
                    id,
                    message: format!("delete document: {e}"),
                }
            }
        }
    }

    /// Attaches the parent trace context from a message to the current thread.
    ///
    /// Returns a context guard that must be held for the duration of the
    /// operation.
    fn attach_parent_trace_context(message: &WorkerMessage) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

        let trace_context = message.trace_context()?;

        let trace_id = TraceId::from_hex(&trace_context.trace_id).ok()?;
        let span_id = SpanId::from_hex(&trace_context.parent_span_id).ok()?;

        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        let otel_context = opentelemetry::Context::current().with_remote_span_context(span_context);

        Some(otel_context.attach())
    }

    /// Processes a worker message and returns the response.
    ///
    /// Runs inside a `worker_handle_message` span parented under the span that
    /// built the message, when a trace context was attached.
    ///
    /// # Parameters
    ///
    /// * `message` - Command posted by the session loop
    ///
    /// # Returns
    ///
    /// Exactly one [`WorkerResponse`]. Failures are reported as
    /// `UploadFailed` or `DeleteFailed`, never as a panic.
    pub fn handle_message(&mut self, message: WorkerMessage) -> WorkerResponse {
        let _context_guard = Self::attach_parent_trace_context(&message);

        let span = tracing::debug_span!("worker_handle_message", message_type = message_type(&message));
        let _guard = span.entered();

        match message {
            WorkerMessage::EncodeFile { batch, index, path, .. } => {
                Self::handle_encode_file(batch, index, &path)
            }
            WorkerMessage::CreateDocument { batch, index, fields, .. } => {
                self.handle_create_document(batch, index, &fields)
            }
            WorkerMessage::DeleteDocument { id, .. } => self.handle_delete_document(id),
        }
    }
}

/// Payloads can be megabytes of base64, so spans only record the variant.
const fn message_type(message: &WorkerMessage) -> &'static str {
    match message {
        WorkerMessage::EncodeFile { .. } => "encode_file",
        WorkerMessage::CreateDocument { .. } => "create_document",
        WorkerMessage::DeleteDocument { .. } => "delete_document",
    }
}

/// Starts the worker thread.
///
/// Messages sent on the returned channel are handled in order and every
/// response is passed to `on_response`. The thread exits when the channel is
/// closed or `on_response` returns `false`.
///
/// # Parameters
///
/// * `worker` - Worker moved onto the new thread
/// * `on_response` - Receives each response; return `false` to stop
///
/// # Returns
///
/// The command sender and the thread's join handle. Dropping the sender
/// stops the thread after it drains pending messages.
///
/// # Errors
///
/// Returns [`DriveError::Worker`] if the thread cannot be spawned.
pub fn spawn_worker<F>(mut worker: DriveWorker, on_response: F) -> Result<(Sender<WorkerMessage>, JoinHandle<()>)>
where
    F: Fn(WorkerResponse) -> bool + Send + 'static,
{
    let (sender, receiver) = mpsc::channel::<WorkerMessage>();

    let handle = std::thread::Builder::new()
        .name("drivedeck-worker".to_string())
        .spawn(move || {
            for message in receiver {
                let response = worker.handle_message(message);
                if !on_response(response) {
                    tracing::debug!("response receiver gone, stopping worker");
                    break;
                }
            }
            tracing::debug!("worker thread finished");
        })
        .map_err(|e| DriveError::Worker(format!("failed to spawn worker thread: {e}")))?;

    Ok((sender, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payload::decode_data_url;
    use crate::store::{Document, JsonDocumentStore, SnapshotEvent};
    use std::sync::mpsc::Receiver;
    use tempfile::TempDir;

    struct RejectingStore;

    impl DocumentStore for RejectingStore {
        fn subscribe(&mut self, _collection: &str) -> Result<Receiver<SnapshotEvent>> {
            Err(DriveError::Subscription("offline".to_string()))
        }

        fn create_document(&mut self, _collection: &str, _fields: &DocumentFields) -> Result<String> {
            Err(DriveError::Store("permission denied".to_string()))
        }

        fn delete_document(&mut self, _collection: &str, _id: &str) -> Result<()> {
            Err(DriveError::Store("permission denied".to_string()))
        }

        fn list_documents(&self, _collection: &str) -> Result<Vec<Document>> {
            Ok(vec![])
        }
    }

    fn json_worker(dir: &TempDir) -> DriveWorker {
        let store = JsonDocumentStore::new(dir.path().join("drive.json")).unwrap();
        DriveWorker::new(Box::new(store), "myFiles")
    }

    #[test]
    fn encodes_file_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let response = DriveWorker::handle_encode_file(1, 0, &path);
        let WorkerResponse::FileEncoded { batch, index, fields } = response else {
            panic!("expected FileEncoded, got {response:?}");
        };
        assert_eq!((batch, index), (1, 0));
        assert_eq!(fields.name, "notes.txt");
        assert_eq!(fields.mime_type, "text/plain");
        assert_eq!(fields.size, 5);
        assert!(fields.timestamp.is_none());
        assert_eq!(decode_data_url(&fields.data).unwrap().bytes, b"hello");
    }

    #[test]
    fn missing_file_fails_the_upload() {
        let dir = TempDir::new().unwrap();
        let mut worker = json_worker(&dir);

        let response = worker.handle_message(WorkerMessage::encode_file(2, 1, dir.path().join("gone.bin")));
        assert!(matches!(response, WorkerResponse::UploadFailed { batch: 2, index: 1, .. }));
    }

    #[test]
    fn creates_and_deletes_documents() {
        let dir = TempDir::new().unwrap();
        let mut worker = json_worker(&dir);
        let fields = DocumentFields::for_upload("a.txt", "text/plain", 1, "data:text/plain;base64,YQ==".to_string(), chrono::Utc::now());

        let response = worker.handle_message(WorkerMessage::create_document(1, 0, fields));
        let WorkerResponse::DocumentCreated { id, .. } = response else {
            panic!("expected DocumentCreated, got {response:?}");
        };
        assert_eq!(worker.store.list_documents("myFiles").unwrap().len(), 1);

        let response = worker.handle_message(WorkerMessage::delete_document(id.clone()));
        assert_eq!(response, WorkerResponse::DocumentDeleted { id });
        assert!(worker.store.list_documents("myFiles").unwrap().is_empty());
    }

    #[test]
    fn rejected_commands_become_failures() {
        let mut worker = DriveWorker::new(Box::new(RejectingStore), "myFiles");
        let fields = DocumentFields::for_upload("a.txt", "text/plain", 1, String::new(), chrono::Utc::now());

        let response = worker.handle_message(WorkerMessage::create_document(4, 2, fields));
        assert!(matches!(response, WorkerResponse::UploadFailed { batch: 4, index: 2, .. }));

        let response = worker.handle_message(WorkerMessage::delete_document("x".to_string()));
        assert!(matches!(response, WorkerResponse::DeleteFailed { ref id, .. } if id == "x"));
    }

    #[test]
    fn spawned_worker_answers_in_order() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();
        let (sender, handle) = spawn_worker(json_worker(&dir), move |response| tx.send(response).is_ok()).unwrap();

        sender.send(WorkerMessage::delete_document("a".to_string())).unwrap();
        sender.send(WorkerMessage::delete_document("b".to_string())).unwrap();
        drop(sender);
        handle.join().unwrap();

        let ids: Vec<WorkerResponse> = rx.iter().collect();
        assert_eq!(
            ids,
            vec![
                WorkerResponse::DocumentDeleted { id: "a".to_string() },
                WorkerResponse::DocumentDeleted { id: "b".to_string() },
            ]
        );
    }
}
