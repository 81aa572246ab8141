//! Event handling and state transition logic.
//!
//! This module implements the event handler that processes user commands,
//! stream snapshots and worker responses, translating them into state changes
//! and action sequences. It is the only place [`DriveState`] is mutated.
//!
//! # Event Types
//!
//! - **Selection**: `SetSearchQuery`, `SetView`, `SetLayout`
//! - **File commands**: `ToggleStar`, `MoveToTrash`, `RestoreFromTrash`,
//!   `PermanentlyDelete`, `Download`, `DismissError`
//! - **Upload dialog**: `OpenUploadDialog`, `QueueFiles`, `RemoveQueuedFile`,
//!   `CloseUploadDialog`, `StartUpload`
//! - **Stream**: `SnapshotReceived`, `SubscriptionFailed`
//! - **Worker**: `WorkerResponse` with typed message variants
//!
//! Every call returns whether the view needs a re-render plus the actions to
//! execute.
//!
//! # Example
//!
//! ```rust
//! use drivedeck::app::{handle_event, DriveState, Event, View};
//!
//! let mut state = DriveState::new();
//! let (should_render, actions) = handle_event(&mut state, &Event::SetView(View::Starred))?;
//! assert!(should_render);
//! assert!(actions.is_empty());
//! # Ok::<(), drivedeck::DriveError>(())
//! ```

use crate::app::upload::{QueuedFile, UploadStep};
use crate::app::{Action, DriveState, Layout, View};
use crate::domain::error::Result;
use crate::domain::FileRecord;
use crate::worker::{WorkerMessage, WorkerResponse};
use std::path::PathBuf;

/// Message shown when a permanent delete fails.
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete file. Please try again.";

/// Events triggered by user commands, the change stream, or worker responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SetSearchQuery(String),
    SetView(View),
    SetLayout(Layout),

    /// Flips the starred flag; local only.
    ToggleStar { id: String },
    /// Moves a visible file into the local bin. No server write.
    MoveToTrash { id: String },
    /// Takes a file out of the local bin. No server write.
    RestoreFromTrash { id: String },
    /// Deletes a binned file's document from the store.
    PermanentlyDelete { id: String },
    /// Writes a file's decoded contents into `destination`.
    Download { id: String, destination: PathBuf },
    DismissError,

    /// Full ordered collection delivered by the change stream.
    SnapshotReceived { files: Vec<FileRecord> },
    /// The change stream failed; the cache is left as is.
    SubscriptionFailed { error: String },

    OpenUploadDialog,
    QueueFiles(Vec<QueuedFile>),
    RemoveQueuedFile(usize),
    CloseUploadDialog,
    StartUpload,

    /// Wraps a response from the background worker thread.
    WorkerResponse(WorkerResponse),
}

impl Event {
    /// Short name used in spans; snapshots and payloads are too large to log.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetSearchQuery(_) => "set_search_query",
            Self::SetView(_) => "set_view",
            Self::SetLayout(_) => "set_layout",
            Self::ToggleStar { .. } => "toggle_star",
            Self::MoveToTrash { .. } => "move_to_trash",
            Self::RestoreFromTrash { .. } => "restore_from_trash",
            Self::PermanentlyDelete { .. } => "permanently_delete",
            Self::Download { .. } => "download",
            Self::DismissError => "dismiss_error",
            Self::SnapshotReceived { .. } => "snapshot_received",
            Self::SubscriptionFailed { .. } => "subscription_failed",
            Self::OpenUploadDialog => "open_upload_dialog",
            Self::QueueFiles(_) => "queue_files",
            Self::RemoveQueuedFile(_) => "remove_queued_file",
            Self::CloseUploadDialog => "close_upload_dialog",
            Self::StartUpload => "start_upload",
            Self::WorkerResponse(_) => "worker_response",
        }
    }
}

/// Processes an event, mutates drive state, and returns actions to execute.
///
/// Returns `(should_render, actions)`. Commands naming a file that is not
/// where the command expects it (for example restoring a file that is not in
/// the bin) are ignored.
///
/// # Errors
///
/// Reserved for failures while building actions; state transitions
/// themselves do not fail.
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut DriveState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = event.name()).entered();

    match event {
        Event::SetSearchQuery(query) => {
            if &state.view_state.search_query == query {
                return Ok((false, vec![]));
            }
            state.view_state.search_query.clone_from(query);
            tracing::trace!(query = %query, "search query updated");
            state.apply_filters();
            Ok((true, vec![]))
        }
        Event::SetView(view) => {
            if state.view_state.view == *view {
                return Ok((false, vec![]));
            }
            tracing::debug!(view = %view, "switching view");
            state.view_state.view = *view;
            state.apply_filters();
            Ok((true, vec![]))
        }
        Event::SetLayout(layout) => {
            let changed = state.layout != *layout;
            state.layout = *layout;
            Ok((changed, vec![]))
        }
        Event::ToggleStar { id } => {
            let starred = state.toggle_star(id);
            tracing::debug!(file_id = %id, starred, "star toggled");
            state.apply_filters();
            Ok((true, vec![]))
        }
        Event::MoveToTrash { id } => match state.move_to_trash(id) {
            Ok(()) => {
                tracing::debug!(file_id = %id, "moved to bin");
                state.apply_filters();
                Ok((true, vec![]))
            }
            Err(e) => {
                tracing::debug!(error = %e, "ignoring move to bin");
                Ok((false, vec![]))
            }
        },
        Event::RestoreFromTrash { id } => {
            if state.pending_deletes.contains(id) {
                tracing::debug!(file_id = %id, "delete in flight, not restoring");
                return Ok((false, vec![]));
            }
            match state.restore_from_trash(id) {
                Ok(()) => {
                    tracing::debug!(file_id = %id, "restored from bin");
                    state.apply_filters();
                    Ok((true, vec![]))
                }
                Err(e) => {
                    tracing::debug!(error = %e, "ignoring restore");
                    Ok((false, vec![]))
                }
            }
        }
        Event::PermanentlyDelete { id } => {
            if !state.view_state.is_trashed(id) {
                tracing::debug!(file_id = %id, "only binned files can be deleted");
                return Ok((false, vec![]));
            }
            if !state.pending_deletes.insert(id.clone()) {
                tracing::debug!(file_id = %id, "delete already in flight");
                return Ok((false, vec![]));
            }
            tracing::debug!(file_id = %id, "deleting document");
            Ok((true, vec![Action::PostToWorker(WorkerMessage::delete_document(id.clone()))]))
        }
        Event::Download { id, destination } => {
            let Some(file) = state.find_file(id) else {
                tracing::debug!(file_id = %id, "nothing to download");
                return Ok((false, vec![]));
            };
            Ok((false, vec![Action::ExportFile {
                file: file.clone(),
                destination: destination.clone(),
            }]))
        }
        Event::DismissError => {
            let had_error = state.error_message.take().is_some();
            Ok((had_error, vec![]))
        }
        Event::SnapshotReceived { files } => {
            let was_loaded = state.loaded;
            let had_stream_error = state.stream_error.is_some();
            if was_loaded && !had_stream_error && &state.files == files {
                tracing::debug!("snapshot unchanged, skipping render");
                return Ok((false, vec![]));
            }

            tracing::debug!(file_count = files.len(), "snapshot received");
            let old_filtered = std::mem::take(&mut state.filtered_files);
            state.replace_cache(files.clone());
            state.apply_filters();

            let should_render = !was_loaded || had_stream_error || state.filtered_files != old_filtered;
            if !should_render {
                tracing::debug!("filtered files unchanged after snapshot, skipping render");
            }
            Ok((should_render, vec![]))
        }
        Event::SubscriptionFailed { error } => {
            tracing::warn!(error = %error, "document stream failed, keeping cached files");
            state.stream_error = Some(format!("Lost connection to the file store: {error}"));
            Ok((true, vec![]))
        }
        Event::OpenUploadDialog => {
            state.upload.open();
            Ok((true, vec![]))
        }
        Event::QueueFiles(files) => {
            if state.upload.is_uploading() {
                tracing::debug!("upload in progress, not queueing files");
                return Ok((false, vec![]));
            }
            tracing::debug!(count = files.len(), "files queued");
            state.upload.queue_files(files.iter().cloned());
            Ok((true, vec![]))
        }
        Event::RemoveQueuedFile(index) => Ok((state.upload.remove_file(*index), vec![])),
        Event::CloseUploadDialog => {
            state.upload.close();
            Ok((true, vec![]))
        }
        Event::StartUpload => {
            let Some((batch, index)) = state.upload.begin() else {
                tracing::debug!("nothing to upload");
                return Ok((false, vec![]));
            };
            tracing::debug!(batch, file_count = state.upload.queue.len(), "upload started");
            Ok((true, encode_next(state, batch, index)))
        }
        Event::WorkerResponse(response) => handle_worker_response(state, response),
    }
}

fn handle_worker_response(state: &mut DriveState, response: &WorkerResponse) -> Result<(bool, Vec<Action>)> {
    match response {
        WorkerResponse::FileEncoded { batch, index, fields } => {
            if !state.upload.encoded(*batch, *index) || !state.upload.start_write(*batch, *index) {
                tracing::debug!(batch, index, "discarding stale encode result");
                return Ok((false, vec![]));
            }
            Ok((true, vec![Action::PostToWorker(WorkerMessage::create_document(
                *batch,
                *index,
                fields.clone(),
            ))]))
        }
        WorkerResponse::DocumentCreated { batch, index, id } => {
            match state.upload.written(*batch, *index) {
                UploadStep::Stale => {
                    tracing::debug!(batch, index, file_id = %id, "discarding stale write result");
                    Ok((false, vec![]))
                }
                UploadStep::Next(next) => Ok((true, encode_next(state, *batch, next))),
                UploadStep::Complete => {
                    tracing::debug!(batch, "upload batch complete");
                    state.upload.close();
                    Ok((true, vec![]))
                }
            }
        }
        WorkerResponse::UploadFailed { batch, index, message } => {
            if state.upload.failed(*batch) {
                tracing::warn!(batch, index, error = %message, "upload failed, abandoning batch");
                Ok((true, vec![]))
            } else {
                tracing::debug!(batch, index, "discarding stale upload failure");
                Ok((false, vec![]))
            }
        }
        WorkerResponse::DocumentDeleted { id } => {
            tracing::debug!(file_id = %id, "document deleted");
            state.finish_delete(id);
            state.apply_filters();
            Ok((true, vec![]))
        }
        WorkerResponse::DeleteFailed { id, message } => {
            tracing::warn!(file_id = %id, error = %message, "delete failed, file stays in bin");
            state.pending_deletes.remove(id);
            state.error_message = Some(DELETE_FAILED_MESSAGE.to_string());
            Ok((true, vec![]))
        }
    }
}

fn encode_next(state: &DriveState, batch: u64, index: usize) -> Vec<Action> {
    state.upload.queue.get(index).map_or_else(Vec::new, |file| {
        vec![Action::PostToWorker(WorkerMessage::encode_file(batch, index, file.path.clone()))]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::upload::UPLOAD_FAILED_MESSAGE;
    use crate::store::DocumentFields;
    use chrono::{Duration, TimeZone, Utc};

    fn file(id: &str, name: &str, minutes: i64) -> FileRecord {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        FileRecord {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            size: 100,
            upload_date: at,
            data: "data:application/pdf;base64,JVBERg==".to_string(),
            timestamp: Some(at),
        }
    }

    fn loaded(files: Vec<FileRecord>) -> DriveState {
        let mut state = DriveState::new();
        handle_event(&mut state, &Event::SnapshotReceived { files }).unwrap();
        state
    }

    fn send(state: &mut DriveState, event: Event) -> (bool, Vec<Action>) {
        handle_event(state, &event).unwrap()
    }

    fn fields(name: &str) -> DocumentFields {
        DocumentFields::for_upload(name, "text/plain", 1, "data:text/plain;base64,YQ==".to_string(), Utc::now())
    }

    fn filtered_ids(state: &DriveState) -> Vec<&str> {
        state.filtered_files.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn first_snapshot_renders_and_loads() {
        let mut state = DriveState::new();
        let (render, _) = send(&mut state, Event::SnapshotReceived { files: vec![file("a", "Report.pdf", 0)] });
        assert!(render);
        assert!(state.loaded);
        assert_eq!(filtered_ids(&state), vec!["a"]);

        let (render, _) = send(&mut state, Event::SnapshotReceived { files: vec![file("a", "Report.pdf", 0)] });
        assert!(!render);
    }

    #[test]
    fn search_filters_and_clears() {
        let mut state = loaded(vec![file("a", "Report.pdf", 0)]);
        send(&mut state, Event::SetSearchQuery("xyz".to_string()));
        assert!(state.filtered_files.is_empty());

        send(&mut state, Event::SetSearchQuery(String::new()));
        assert_eq!(filtered_ids(&state), vec!["a"]);
    }

    #[test]
    fn filtered_files_track_every_change() {
        let mut state = loaded(vec![file("b", "b.txt", 2), file("a", "a.txt", 1)]);
        let events = vec![
            Event::ToggleStar { id: "a".to_string() },
            Event::SetView(View::Starred),
            Event::MoveToTrash { id: "a".to_string() },
            Event::SetView(View::Bin),
            Event::RestoreFromTrash { id: "a".to_string() },
            Event::SetView(View::Recent),
            Event::SetSearchQuery("B".to_string()),
        ];
        for event in events {
            send(&mut state, event);
            assert_eq!(state.filtered_files, state.current_files());
        }
        assert_eq!(filtered_ids(&state), vec!["b"]);
    }

    #[test]
    fn trash_hides_file_without_store_write() {
        let mut state = loaded(vec![file("a", "a.txt", 1)]);
        let (render, actions) = send(&mut state, Event::MoveToTrash { id: "a".to_string() });
        assert!(render);
        assert!(actions.is_empty());
        assert!(state.filtered_files.is_empty());

        send(&mut state, Event::SetView(View::Bin));
        assert_eq!(filtered_ids(&state), vec!["a"]);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut state = loaded(vec![file("a", "a.txt", 1)]);
        assert_eq!(send(&mut state, Event::MoveToTrash { id: "zzz".to_string() }), (false, vec![]));
        assert_eq!(send(&mut state, Event::RestoreFromTrash { id: "a".to_string() }), (false, vec![]));
        assert_eq!(send(&mut state, Event::PermanentlyDelete { id: "a".to_string() }), (false, vec![]));
    }

    #[test]
    fn permanent_delete_round_trip() {
        let mut state = loaded(vec![file("a", "a.txt", 1)]);
        send(&mut state, Event::MoveToTrash { id: "a".to_string() });

        let (_, actions) = send(&mut state, Event::PermanentlyDelete { id: "a".to_string() });
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::DeleteDocument { id, .. })] if id == "a"
        ));
        let (_, again) = send(&mut state, Event::PermanentlyDelete { id: "a".to_string() });
        assert!(again.is_empty());

        send(&mut state, Event::WorkerResponse(WorkerResponse::DocumentDeleted { id: "a".to_string() }));
        assert!(state.view_state.trash.is_empty());
        assert!(state.pending_deletes.is_empty());

        // The stream's own snapshot follows; the id is gone for good.
        send(&mut state, Event::SnapshotReceived { files: vec![] });
        assert!(state.find_file("a").is_none());
    }

    #[test]
    fn failed_delete_keeps_file_in_bin() {
        let mut state = loaded(vec![file("a", "a.txt", 1)]);
        send(&mut state, Event::MoveToTrash { id: "a".to_string() });
        send(&mut state, Event::PermanentlyDelete { id: "a".to_string() });

        send(&mut state, Event::WorkerResponse(WorkerResponse::DeleteFailed {
            id: "a".to_string(),
            message: "permission denied".to_string(),
        }));
        assert!(state.view_state.is_trashed("a"));
        assert_eq!(state.error_message.as_deref(), Some(DELETE_FAILED_MESSAGE));
        assert_eq!(state.compute_viewmodel().error.as_deref(), Some(DELETE_FAILED_MESSAGE));

        assert_eq!(send(&mut state, Event::DismissError), (true, vec![]));
        assert!(state.error_message.is_none());
    }

    #[test]
    fn download_exports_cached_or_binned_file() {
        let mut state = loaded(vec![file("a", "a.pdf", 1)]);
        let destination = PathBuf::from("/tmp/out");

        let (_, actions) = send(&mut state, Event::Download { id: "a".to_string(), destination: destination.clone() });
        assert_eq!(actions, vec![Action::ExportFile { file: file("a", "a.pdf", 1), destination: destination.clone() }]);

        send(&mut state, Event::MoveToTrash { id: "a".to_string() });
        let (_, actions) = send(&mut state, Event::Download { id: "a".to_string(), destination });
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn subscription_failure_keeps_cache() {
        let mut state = loaded(vec![file("a", "a.txt", 1)]);
        let (render, _) = send(&mut state, Event::SubscriptionFailed { error: "offline".to_string() });
        assert!(render);
        assert_eq!(filtered_ids(&state), vec!["a"]);
        assert!(state.stream_error.is_some());

        let (render, _) = send(&mut state, Event::SnapshotReceived { files: vec![file("a", "a.txt", 1)] });
        assert!(render);
        assert!(state.stream_error.is_none());
    }

    fn queue(state: &mut DriveState, names: &[&str]) {
        send(state, Event::OpenUploadDialog);
        let files = names.iter().map(|name| QueuedFile::new(format!("/tmp/{name}"), 1)).collect();
        send(state, Event::QueueFiles(files));
    }

    #[test]
    fn upload_runs_files_sequentially_then_closes() {
        let mut state = DriveState::new();
        queue(&mut state, &["one.txt", "two.txt"]);

        let (_, actions) = send(&mut state, Event::StartUpload);
        let [Action::PostToWorker(WorkerMessage::EncodeFile { batch, index: 0, path, .. })] = actions.as_slice() else {
            panic!("expected first encode, got {actions:?}");
        };
        assert_eq!(path, &PathBuf::from("/tmp/one.txt"));
        let batch = *batch;

        let (_, actions) = send(&mut state, Event::WorkerResponse(WorkerResponse::FileEncoded { batch, index: 0, fields: fields("one.txt") }));
        assert!(matches!(actions.as_slice(), [Action::PostToWorker(WorkerMessage::CreateDocument { index: 0, .. })]));
        assert_eq!(state.upload.percent(0), Some(75));

        let (_, actions) = send(&mut state, Event::WorkerResponse(WorkerResponse::DocumentCreated { batch, index: 0, id: "x".to_string() }));
        assert!(matches!(actions.as_slice(), [Action::PostToWorker(WorkerMessage::EncodeFile { index: 1, .. })]));

        send(&mut state, Event::WorkerResponse(WorkerResponse::FileEncoded { batch, index: 1, fields: fields("two.txt") }));
        let (render, actions) = send(&mut state, Event::WorkerResponse(WorkerResponse::DocumentCreated { batch, index: 1, id: "y".to_string() }));
        assert!(render);
        assert!(actions.is_empty());
        assert!(!state.upload.open);
        assert!(state.upload.queue.is_empty());
    }

    #[test]
    fn repeated_encode_result_posts_one_write() {
        let mut state = DriveState::new();
        queue(&mut state, &["one.txt"]);
        send(&mut state, Event::StartUpload);
        let batch = state.upload.batch;

        let encoded = Event::WorkerResponse(WorkerResponse::FileEncoded { batch, index: 0, fields: fields("one.txt") });
        let (_, actions) = send(&mut state, encoded.clone());
        assert_eq!(actions.len(), 1);
        assert_eq!(send(&mut state, encoded), (false, vec![]));
        assert_eq!(state.upload.percent(0), Some(75));
    }

    #[test]
    fn restore_after_snapshot_dropped_the_file_shows_it_again() {
        let mut state = DriveState::new();
        send(&mut state, Event::SnapshotReceived { files: vec![file("a", "a.txt", 1)] });
        send(&mut state, Event::MoveToTrash { id: "a".to_string() });
        send(&mut state, Event::SnapshotReceived { files: vec![] });

        assert_eq!(send(&mut state, Event::RestoreFromTrash { id: "a".to_string() }), (true, vec![]));
        assert_eq!(state.filtered_files.len(), 1);
        assert_eq!(state.filtered_files[0].id, "a");
    }

    #[test]
    fn upload_failure_stops_batch() {
        let mut state = DriveState::new();
        queue(&mut state, &["one.txt", "two.txt", "three.txt"]);
        send(&mut state, Event::StartUpload);
        let batch = state.upload.batch;

        send(&mut state, Event::WorkerResponse(WorkerResponse::FileEncoded { batch, index: 0, fields: fields("one.txt") }));
        send(&mut state, Event::WorkerResponse(WorkerResponse::DocumentCreated { batch, index: 0, id: "x".to_string() }));
        let (_, actions) = send(&mut state, Event::WorkerResponse(WorkerResponse::UploadFailed {
            batch,
            index: 1,
            message: "write rejected".to_string(),
        }));

        assert!(actions.is_empty());
        assert!(state.upload.open);
        assert!(!state.upload.is_uploading());
        assert_eq!(state.upload.error.as_deref(), Some(UPLOAD_FAILED_MESSAGE));
        assert_eq!(state.upload.percent(2), None);
        assert_eq!(state.compute_viewmodel().upload.unwrap().error.as_deref(), Some(UPLOAD_FAILED_MESSAGE));
    }

    #[test]
    fn closing_mid_upload_discards_late_responses() {
        let mut state = DriveState::new();
        queue(&mut state, &["one.txt", "two.txt"]);
        send(&mut state, Event::StartUpload);
        let batch = state.upload.batch;
        send(&mut state, Event::WorkerResponse(WorkerResponse::FileEncoded { batch, index: 0, fields: fields("one.txt") }));

        send(&mut state, Event::CloseUploadDialog);
        let (render, actions) = send(&mut state, Event::WorkerResponse(WorkerResponse::DocumentCreated { batch, index: 0, id: "x".to_string() }));
        assert!(!render);
        assert!(actions.is_empty());
    }

    #[test]
    fn start_upload_needs_queued_files() {
        let mut state = DriveState::new();
        send(&mut state, Event::OpenUploadDialog);
        assert_eq!(send(&mut state, Event::StartUpload), (false, vec![]));

        queue(&mut state, &["one.txt"]);
        send(&mut state, Event::StartUpload);
        assert_eq!(send(&mut state, Event::StartUpload), (false, vec![]));
        assert_eq!(send(&mut state, Event::RemoveQueuedFile(0)), (false, vec![]));
        assert_eq!(send(&mut state, Event::QueueFiles(vec![QueuedFile::new("/tmp/late.txt", 1)])), (false, vec![]));
    }

    #[test]
    fn layout_toggle_does_not_change_files() {
        let mut state = loaded(vec![file("a", "a.txt", 1)]);
        let before = state.filtered_files.clone();
        assert_eq!(send(&mut state, Event::SetLayout(Layout::Grid)), (true, vec![]));
        assert_eq!(send(&mut state, Event::SetLayout(Layout::Grid)), (false, vec![]));
        assert_eq!(state.filtered_files, before);
    }
}
