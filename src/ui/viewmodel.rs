//! View model types representing renderable UI state.
//!
//! View models are immutable snapshots computed by
//! [`DriveState::compute_viewmodel`](crate::app::DriveState::compute_viewmodel)
//! and consumed by the renderer or by any subscriber of
//! [`Session::watch`](crate::runtime::Session::watch). They carry display-ready
//! labels and no business logic.
//!
//! # Example
//!
//! ```rust
//! use drivedeck::app::{DriveState, View};
//!
//! let mut state = DriveState::new();
//! state.view_state.view = View::Bin;
//! let vm = state.compute_viewmodel();
//! assert_eq!(vm.header.title, "Bin");
//! assert!(vm.loading);
//! ```

use crate::app::{Layout, View};
use crate::domain::FileKind;
use serde::Serialize;

/// Complete UI view model for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UIViewModel {
    pub header: HeaderInfo,

    /// Navigation entries in sidebar order.
    pub sidebar: Vec<SidebarEntry>,

    pub layout: Layout,

    /// Files to display, in display order.
    pub display_items: Vec<DisplayItem>,

    /// Set when loaded and nothing matches.
    pub empty_state: Option<EmptyState>,

    /// `true` until the first snapshot arrives.
    pub loading: bool,

    /// Inline error: a failed command or a broken change stream.
    pub error: Option<String>,

    /// Upload dialog, when open.
    pub upload: Option<UploadPanel>,
}

/// Header display information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderInfo {
    /// View title, with the search suffix when a query is active.
    pub title: String,

    /// Number of files shown.
    pub count: usize,
}

/// One navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarEntry {
    pub view: View,

    /// Display title, e.g. "My Drive".
    pub title: String,

    /// Whether this is the selected view.
    pub is_active: bool,
}

/// Display information for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    /// Store-assigned document id, used to address commands.
    pub id: String,
    pub name: String,

    /// Icon category derived from the MIME type.
    #[serde(skip)]
    pub kind: FileKind,
    pub mime_type: String,

    /// Human-readable size, e.g. "1.2 MB".
    pub size_label: String,

    /// Upload date, e.g. "Mar 1, 2024".
    pub modified_label: String,
    pub is_starred: bool,

    /// A permanent delete is in flight.
    pub is_pending_delete: bool,

    /// Entries of the per-file menu, in menu order.
    pub actions: Vec<FileAction>,
}

/// Commands offered in a file's menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FileAction {
    Download,
    MoveToTrash,
    Restore,
    DeleteForever,
}

impl FileAction {
    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Download => "Download",
            Self::MoveToTrash => "Move to bin",
            Self::Restore => "Restore",
            Self::DeleteForever => "Delete forever",
        }
    }
}

/// Empty state message display information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub message: String,
}

/// Upload dialog contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadPanel {
    pub rows: Vec<UploadRow>,

    /// "Upload N Files" or "Uploading...".
    pub button_label: String,
    pub button_enabled: bool,
    pub error: Option<String>,
}

/// One queued file in the upload dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRow {
    pub name: String,
    pub size_label: String,

    /// Progress percentage once the file's upload has started.
    pub progress: Option<u8>,

    /// Removal is refused while a batch runs.
    pub removable: bool,
}
