//! Session runtime: the event loop that owns [`DriveState`].
//!
//! A [`Session`] wires three inputs into one event channel:
//!
//! ```text
//! store subscription ──relay thread──▶ Event::SnapshotReceived / SubscriptionFailed ─┐
//! worker thread ─────────────────────▶ Event::WorkerResponse ────────────────────────┼─▶ handle_event ─▶ actions
//! user commands (Session::handle, Session::sender) ──────────────────────────────────┘
//! ```
//!
//! After every event that needs a re-render, each watcher registered with
//! [`Session::watch`] receives a fresh [`UIViewModel`].

use crate::app::{handle_event, Action, DriveState, Event};
use crate::domain::error::{DriveError, Result};
use crate::domain::payload::decode_data_url;
use crate::domain::FileRecord;
use crate::store::{Document, DocumentStore, SnapshotEvent};
use crate::ui::UIViewModel;
use crate::worker::{spawn_worker, DriveWorker, WorkerMessage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Message shown when the stream ends without an error.
const STREAM_CLOSED: &str = "change stream closed";

/// Fallback name for downloads whose stored name has no usable file name.
const DOWNLOAD_FALLBACK_NAME: &str = "download";

/// A running drive session.
pub struct Session {
    state: DriveState,
    events_tx: Sender<Event>,
    events_rx: Receiver<Event>,
    worker: Option<Sender<WorkerMessage>>,
    worker_handle: Option<JoinHandle<()>>,
    relay_handle: Option<JoinHandle<()>>,
    watchers: Vec<Sender<UIViewModel>>,
}

impl Session {
    /// Subscribes to `collection` and moves `store` onto the worker thread.
    ///
    /// A subscription that cannot be established is reported as
    /// [`Event::SubscriptionFailed`]; the session still starts so commands
    /// and uploads keep working.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Worker`] if a background thread cannot be spawned.
    pub fn start(mut store: Box<dyn DocumentStore>, collection: &str) -> Result<Self> {
        let _span = tracing::debug_span!("session_start", collection = %collection).entered();
        let (events_tx, events_rx) = mpsc::channel();

        let relay_handle = match store.subscribe(collection) {
            Ok(snapshots) => Some(spawn_relay(snapshots, events_tx.clone())?),
            Err(e) => {
                tracing::warn!(error = %e, "could not subscribe to collection");
                let _ = events_tx.send(Event::SubscriptionFailed { error: e.to_string() });
                None
            }
        };

        let responses = events_tx.clone();
        let (worker, worker_handle) = spawn_worker(DriveWorker::new(store, collection), move |response| {
            responses.send(Event::WorkerResponse(response)).is_ok()
        })?;

        Ok(Self {
            state: DriveState::new(),
            events_tx,
            events_rx,
            worker: Some(worker),
            worker_handle: Some(worker_handle),
            relay_handle,
            watchers: Vec::new(),
        })
    }

    #[must_use]
    pub const fn state(&self) -> &DriveState {
        &self.state
    }

    /// Returns a sender for feeding events from other threads.
    #[must_use]
    pub fn sender(&self) -> Sender<Event> {
        self.events_tx.clone()
    }

    /// Registers a watcher. The current view model is delivered immediately.
    pub fn watch(&mut self) -> Receiver<UIViewModel> {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(self.state.compute_viewmodel());
        self.watchers.push(tx);
        rx
    }

    /// Handles one event and executes the resulting actions.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Worker`] if the worker thread is gone.
    pub fn handle(&mut self, event: Event) -> Result<()> {
        let (mut should_render, actions) = handle_event(&mut self.state, &event)?;

        for action in actions {
            should_render |= self.execute(action)?;
        }

        if should_render {
            self.notify();
        }
        Ok(())
    }

    /// Handles every event already queued, without blocking.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`handle`](Self::handle).
    pub fn process_pending(&mut self) -> Result<usize> {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Handles queued events until `condition` holds or `timeout` elapses.
    ///
    /// Returns whether the condition was met.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`handle`](Self::handle).
    pub fn wait_until<F>(&mut self, timeout: Duration, condition: F) -> Result<bool>
    where
        F: Fn(&DriveState) -> bool,
    {
        let deadline = Instant::now() + timeout;
        while !condition(&self.state) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events_rx.recv_timeout(remaining) {
                Ok(event) => self.handle(event)?,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Runs the event loop until `stop` is set.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`handle`](Self::handle).
    pub fn run_until(&mut self, stop: &AtomicBool) -> Result<()> {
        const POLL: Duration = Duration::from_millis(100);

        while !stop.load(Ordering::Relaxed) {
            match self.events_rx.recv_timeout(POLL) {
                Ok(event) => self.handle(event)?,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.process_pending()?;
        Ok(())
    }

    /// Executes one action. Returns whether it changed rendered state.
    fn execute(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::PostToWorker(message) => {
                let worker = self
                    .worker
                    .as_ref()
                    .ok_or_else(|| DriveError::Worker("worker stopped".to_string()))?;
                worker
                    .send(message)
                    .map_err(|e| DriveError::Worker(format!("failed to post message: {e}")))?;
                Ok(false)
            }
            Action::ExportFile { file, destination } => match export_file(&file, &destination) {
                Ok(path) => {
                    tracing::info!(file_id = %file.id, path = %path.display(), "file downloaded");
                    Ok(false)
                }
                Err(e) => {
                    tracing::warn!(file_id = %file.id, error = %e, "download failed");
                    self.state.error_message = Some(format!("Failed to download {}: {e}", file.name));
                    Ok(true)
                }
            },
        }
    }

    fn notify(&mut self) {
        if self.watchers.is_empty() {
            return;
        }
        let viewmodel = self.state.compute_viewmodel();
        self.watchers.retain(|watcher| watcher.send(viewmodel.clone()).is_ok());
    }

    /// Stops the worker and the stream relay, waiting for both threads.
    pub fn shutdown(mut self) {
        self.stop_threads();
    }

    fn stop_threads(&mut self) {
        // Closing the command channel ends the worker, which drops the store
        // and with it the subscription feeding the relay.
        self.worker.take();
        for handle in [self.worker_handle.take(), self.relay_handle.take()].into_iter().flatten() {
            if handle.join().is_err() {
                tracing::warn!("background thread panicked");
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_threads();
    }
}

/// Converts stream documents into cache records, skipping malformed ones.
#[must_use]
pub fn documents_to_records(documents: &[Document]) -> Vec<FileRecord> {
    documents
        .iter()
        .filter_map(|document| match document.to_file_record() {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(document_id = %document.id, error = %e, "skipping malformed document");
                None
            }
        })
        .collect()
}

fn spawn_relay(snapshots: Receiver<SnapshotEvent>, events: Sender<Event>) -> Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("drivedeck-stream".to_string())
        .spawn(move || {
            for snapshot in snapshots {
                let event = match snapshot {
                    SnapshotEvent::Documents(documents) => Event::SnapshotReceived {
                        files: documents_to_records(&documents),
                    },
                    SnapshotEvent::Failed(error) => Event::SubscriptionFailed { error },
                };
                if events.send(event).is_err() {
                    return;
                }
            }
            tracing::debug!("snapshot stream ended");
            let _ = events.send(Event::SubscriptionFailed {
                error: STREAM_CLOSED.to_string(),
            });
        })
        .map_err(|e| DriveError::Worker(format!("failed to spawn stream relay: {e}")))
}

/// Decodes a file's payload and writes it to `destination/<name>`.
///
/// Only the final component of the stored name is used, so a name like
/// `../x` cannot escape `destination`.
///
/// # Errors
///
/// Returns [`DriveError::Encoding`] for a malformed payload and
/// [`DriveError::Io`] if the file cannot be written.
pub fn export_file(file: &FileRecord, destination: &Path) -> Result<PathBuf> {
    let payload = decode_data_url(&file.data)?;
    let name = Path::new(&file.name)
        .file_name()
        .map_or_else(|| DOWNLOAD_FALLBACK_NAME.into(), ToOwned::to_owned);

    std::fs::create_dir_all(destination)?;
    let path = destination.join(name);
    std::fs::write(&path, &payload.bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payload::encode_data_url;
    use crate::store::DocumentFields;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(name: &str, data: String) -> FileRecord {
        FileRecord {
            id: "id".to_string(),
            name: name.to_string(),
            mime_type: "text/plain".to_string(),
            size: 2,
            upload_date: Utc::now(),
            data,
            timestamp: None,
        }
    }

    #[test]
    fn export_writes_decoded_bytes() {
        let dir = TempDir::new().unwrap();
        let file = record("hello.txt", encode_data_url("text/plain", b"hi"));

        let path = export_file(&file, &dir.path().join("out")).unwrap();
        assert_eq!(path, dir.path().join("out").join("hello.txt"));
        assert_eq!(std::fs::read(path).unwrap(), b"hi");
    }

    #[test]
    fn export_stays_inside_destination() {
        let dir = TempDir::new().unwrap();
        let file = record("../../escape.txt", encode_data_url("text/plain", b"x"));

        let path = export_file(&file, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("escape.txt"));
    }

    #[test]
    fn export_rejects_bad_payload() {
        let dir = TempDir::new().unwrap();
        let file = record("bad.txt", "not a data url".to_string());
        assert!(matches!(export_file(&file, dir.path()), Err(DriveError::Encoding(_))));
    }

    #[test]
    fn malformed_documents_are_skipped() {
        let good = Document {
            id: "good".to_string(),
            fields: DocumentFields::for_upload("a.txt", "text/plain", 1, String::new(), Utc::now()),
        };
        let mut bad = good.clone();
        bad.id = "bad".to_string();
        bad.fields.upload_date = "yesterday".to_string();

        let records = documents_to_records(&[bad, good]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "good");
    }
}
