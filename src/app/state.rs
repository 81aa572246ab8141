//! Drive state container and view-state derivation.
//!
//! This module defines [`DriveState`], the single owner of the raw file cache
//! and all transient UI selections, and [`derive_files`], the pure function
//! that turns (cache, [`ViewState`]) into the list shown to the user.
//!
//! # State Components
//!
//! - **Files**: Raw cache, replaced wholesale by every stream snapshot
//! - **View State**: Active view, search query, starred ids, local bin
//! - **Filtered Files**: Last derivation result, recomputed after every change
//! - **Upload Dialog**: Queue and progress of the sequential upload batch
//! - **Errors**: Inline message from the last failed command, stream error
//!
//! The bin exists only in memory. A trashed file's server document is left
//! untouched, so stream redeliveries of a trashed id are kept out of the
//! visible cache until the file is restored or deleted for good.
//!
//! # Example
//!
//! ```rust
//! use drivedeck::app::{DriveState, View};
//!
//! let mut state = DriveState::new();
//! state.view_state.view = View::Recent;
//! state.apply_filters();
//! assert!(state.filtered_files.is_empty());
//! ```

use super::modes::{Layout, View, RECENT_LIMIT};
use super::upload::UploadDialog;
use crate::domain::error::{DriveError, Result};
use crate::domain::FileRecord;
use crate::ui::viewmodel::{
    DisplayItem, EmptyState, FileAction, HeaderInfo, SidebarEntry, UIViewModel, UploadPanel, UploadRow,
};
use std::collections::HashSet;

/// Transient user selections that drive the derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub view: View,

    /// Free-text query; empty means no search.
    pub search_query: String,

    /// Ids the user starred this session.
    pub starred: HashSet<String>,

    /// Snapshots of trashed files, in the order they were trashed.
    pub trash: Vec<FileRecord>,
}

impl ViewState {
    #[must_use]
    pub fn is_trashed(&self, id: &str) -> bool {
        self.trash.iter().any(|file| file.id == id)
    }

    #[must_use]
    pub fn is_starred(&self, id: &str) -> bool {
        self.starred.contains(id)
    }
}

/// Derives the displayed file list.
///
/// 1. Drop cached files that sit in the local bin
/// 2. Keep names containing the search query (case-insensitive), if any
/// 3. Apply the view: starred ids only, or the newest uploads capped at
///    [`RECENT_LIMIT`], or the bin contents (also searched)
///
/// Views other than recent keep the stream order. The function has no side
/// effects: equal inputs always give equal output.
#[must_use]
pub fn derive_files(cache: &[FileRecord], view_state: &ViewState) -> Vec<FileRecord> {
    let query = view_state.search_query.to_lowercase();
    let matches_query = |file: &FileRecord| query.is_empty() || file.name_matches(&query);

    if view_state.view == View::Bin {
        return view_state
            .trash
            .iter()
            .filter(|file| matches_query(file))
            .cloned()
            .collect();
    }

    let trashed: HashSet<&str> = view_state.trash.iter().map(|file| file.id.as_str()).collect();
    let searched = cache
        .iter()
        .filter(|file| !trashed.contains(file.id.as_str()))
        .filter(|file| matches_query(file));

    match view_state.view {
        View::Starred => searched
            .filter(|file| view_state.starred.contains(&file.id))
            .cloned()
            .collect(),
        View::Recent => {
            let mut recent: Vec<FileRecord> = searched.cloned().collect();
            recent.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
            recent.truncate(RECENT_LIMIT);
            recent
        }
        View::MyDrive | View::Bin => searched.cloned().collect(),
    }
}

/// Central drive state container.
///
/// Mutated only by the event handler; every mutation is followed by
/// [`apply_filters`](Self::apply_filters) so `filtered_files` always equals
/// [`current_files`](Self::current_files).
#[derive(Debug, Clone, Default)]
pub struct DriveState {
    /// Raw cache in stream order (server timestamp descending).
    pub files: Vec<FileRecord>,

    pub view_state: ViewState,

    /// Result of the last derivation.
    pub filtered_files: Vec<FileRecord>,

    pub layout: Layout,

    /// Set once the first snapshot has arrived.
    pub loaded: bool,

    /// Inline message from the last failed command.
    pub error_message: Option<String>,

    /// Set when the change stream fails; the cache is then stale.
    pub stream_error: Option<String>,

    /// Ids with a delete command in flight.
    pub pending_deletes: HashSet<String>,

    pub upload: UploadDialog,
}

impl DriveState {
    /// Creates an empty state with default selections (My Drive, no search).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the displayed list from the current cache and selections.
    #[must_use]
    pub fn current_files(&self) -> Vec<FileRecord> {
        derive_files(&self.files, &self.view_state)
    }

    /// Recomputes `filtered_files`.
    pub fn apply_filters(&mut self) {
        let _span = tracing::debug_span!("apply_filters",
            total_files = self.files.len(),
            trashed = self.view_state.trash.len(),
            query_len = self.view_state.search_query.len(),
            view = %self.view_state.view
        ).entered();

        self.filtered_files = self.current_files();

        tracing::debug!(filtered_count = self.filtered_files.len(), "filters applied");
    }

    /// Cached files not in the local bin, in stream order.
    pub fn visible_files(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.iter().filter(|file| !self.view_state.is_trashed(&file.id))
    }

    /// Looks a file up in the visible cache, then in the bin.
    #[must_use]
    pub fn find_file(&self, id: &str) -> Option<&FileRecord> {
        self.visible_files()
            .find(|file| file.id == id)
            .or_else(|| self.view_state.trash.iter().find(|file| file.id == id))
    }

    /// Replaces the raw cache with a stream snapshot.
    pub fn replace_cache(&mut self, files: Vec<FileRecord>) {
        let suppressed = files
            .iter()
            .filter(|file| self.view_state.is_trashed(&file.id))
            .count();
        if suppressed > 0 {
            tracing::debug!(suppressed, "snapshot contains trashed files, keeping them hidden");
        }

        self.files = files;
        self.loaded = true;
        self.stream_error = None;
    }

    /// Flips the starred flag of `id`. Returns the new flag.
    pub fn toggle_star(&mut self, id: &str) -> bool {
        if self.view_state.starred.remove(id) {
            false
        } else {
            self.view_state.starred.insert(id.to_string());
            true
        }
    }

    /// Moves a visible file into the local bin.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::NotFound`] if `id` is not in the visible cache.
    pub fn move_to_trash(&mut self, id: &str) -> Result<()> {
        let file = self
            .visible_files()
            .find(|file| file.id == id)
            .cloned()
            .ok_or_else(|| DriveError::NotFound(id.to_string()))?;

        self.view_state.trash.push(file);
        Ok(())
    }

    /// Takes a file out of the local bin and back into the visible cache.
    ///
    /// If a snapshot dropped the file while it sat in the bin, the bin copy is
    /// put back into the cache, ordered by server timestamp. The next snapshot
    /// decides whether it stays.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::NotFound`] if `id` is not in the bin.
    pub fn restore_from_trash(&mut self, id: &str) -> Result<()> {
        let position = self
            .view_state
            .trash
            .iter()
            .position(|file| file.id == id)
            .ok_or_else(|| DriveError::NotFound(id.to_string()))?;

        let file = self.view_state.trash.remove(position);
        if !self.files.iter().any(|cached| cached.id == id) {
            tracing::info!(file_id = %id, "restored file is missing from the cache, reinserting bin copy");
            let at = self
                .files
                .iter()
                .position(|cached| cached.timestamp < file.timestamp)
                .unwrap_or(self.files.len());
            self.files.insert(at, file);
        }
        Ok(())
    }

    /// Drops a permanently deleted file from the bin and the cache.
    pub fn finish_delete(&mut self, id: &str) {
        self.pending_deletes.remove(id);
        self.view_state.trash.retain(|file| file.id != id);
        self.files.retain(|file| file.id != id);
    }

    /// Computes a renderable view model from the current state.
    #[must_use]
    pub fn compute_viewmodel(&self) -> UIViewModel {
        let view = self.view_state.view;

        let display_items = self
            .filtered_files
            .iter()
            .map(|file| self.compute_display_item(file))
            .collect::<Vec<_>>();

        let empty_state = if display_items.is_empty() && self.loaded {
            Some(self.compute_empty_state())
        } else {
            None
        };

        UIViewModel {
            header: self.compute_header(),
            sidebar: View::ALL
                .iter()
                .map(|&entry| SidebarEntry {
                    view: entry,
                    title: entry.title().to_string(),
                    is_active: entry == view,
                })
                .collect(),
            layout: self.layout,
            display_items,
            empty_state,
            loading: !self.loaded,
            error: self.error_message.clone().or_else(|| self.stream_error.clone()),
            upload: self.compute_upload_panel(),
        }
    }

    fn compute_display_item(&self, file: &FileRecord) -> DisplayItem {
        let actions = if self.view_state.view == View::Bin {
            vec![FileAction::Download, FileAction::Restore, FileAction::DeleteForever]
        } else {
            vec![FileAction::Download, FileAction::MoveToTrash]
        };

        DisplayItem {
            id: file.id.clone(),
            name: file.name.clone(),
            kind: file.kind(),
            mime_type: file.mime_type.clone(),
            size_label: file.size_label(),
            modified_label: file.modified_label(),
            is_starred: self.view_state.is_starred(&file.id),
            is_pending_delete: self.pending_deletes.contains(&file.id),
            actions,
        }
    }

    fn compute_header(&self) -> HeaderInfo {
        let view = self.view_state.view;
        let query = &self.view_state.search_query;
        let title = if query.is_empty() {
            view.title().to_string()
        } else {
            format!("{} - Search results for \"{query}\"", view.title())
        };
        HeaderInfo {
            title,
            count: self.filtered_files.len(),
        }
    }

    fn compute_empty_state(&self) -> EmptyState {
        let query = &self.view_state.search_query;
        let message = if query.is_empty() {
            self.view_state.view.empty_message().to_string()
        } else {
            format!("No files found matching \"{query}\"")
        };
        EmptyState { message }
    }

    fn compute_upload_panel(&self) -> Option<UploadPanel> {
        let dialog = &self.upload;
        if !dialog.open {
            return None;
        }

        let uploading = dialog.is_uploading();
        let rows = dialog
            .queue
            .iter()
            .enumerate()
            .map(|(index, file)| UploadRow {
                name: file.name.clone(),
                size_label: crate::domain::file::format_size(file.size),
                progress: dialog.percent(index),
                removable: !uploading,
            })
            .collect();

        let count = dialog.queue.len();
        let button_label = if uploading {
            "Uploading...".to_string()
        } else {
            format!("Upload {count} File{}", if count == 1 { "" } else { "s" })
        };

        Some(UploadPanel {
            rows,
            button_label,
            button_enabled: count > 0 && !uploading,
            error: dialog.error.clone(),
        })
    }
}
