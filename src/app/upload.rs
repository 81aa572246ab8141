//! Upload dialog state and the sequential upload batch state machine.
//!
//! A batch walks its queue one file at a time:
//!
//! ```text
//! Idle ─begin─▶ Encoding(0) ─encoded, start_write─▶ Writing(0) ─written─▶ Encoding(1) ─▶ … ─▶ Idle (dialog closes)
//!                    │                                  │
//!                    └──────────────failed──────────────┴──▶ Idle with error, remaining files abandoned
//! ```
//!
//! Every batch gets a fresh id. Responses carrying an older id (for example a
//! write that finished after the dialog was closed) are ignored.

use crate::domain::error::{DriveError, Result};
use crate::infrastructure::file_name_of;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Message shown when any file in a batch fails.
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload files. Please try again.";

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl QueuedFile {
    /// Creates a queue entry from known metadata.
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = file_name_of(&path);
        Self { path, name, size }
    }

    /// Creates a queue entry by reading the file's metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be read or is not a regular file.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(DriveError::NotFound(format!("{} is not a file", path.display())));
        }
        Ok(Self::new(path, metadata.len()))
    }
}

/// Coarse per-file progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UploadStage {
    EncodeStarted,
    EncodeDone,
    WriteStarted,
    WriteDone,
}

impl UploadStage {
    /// Progress as a percentage.
    #[must_use]
    pub const fn percent(self) -> u8 {
        match self {
            Self::EncodeStarted => 25,
            Self::EncodeDone => 50,
            Self::WriteStarted => 75,
            Self::WriteDone => 100,
        }
    }
}

/// Where the current batch is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Encoding {
        index: usize,
    },
    Writing {
        index: usize,
    },
}

/// Outcome of a completed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    /// The response belonged to an abandoned batch.
    Stale,
    /// The file at this index should be encoded next.
    Next(usize),
    /// Every queued file has been written.
    Complete,
}

/// State of the upload dialog.
#[derive(Debug, Clone, Default)]
pub struct UploadDialog {
    pub open: bool,
    pub queue: Vec<QueuedFile>,
    pub progress: BTreeMap<usize, UploadStage>,
    pub phase: UploadPhase,
    /// Id of the current (or last) batch.
    pub batch: u64,
    pub error: Option<String>,
}

impl UploadDialog {
    /// Opens the dialog and clears any previous error.
    pub fn open(&mut self) {
        self.open = true;
        self.error = None;
    }

    /// Closes the dialog and resets it.
    ///
    /// An in-flight write is not cancelled; bumping the batch id makes its
    /// response stale.
    pub fn close(&mut self) {
        if self.is_uploading() {
            tracing::debug!(batch = self.batch, "upload dialog closed mid-batch");
        }
        self.open = false;
        self.queue.clear();
        self.progress.clear();
        self.phase = UploadPhase::Idle;
        self.error = None;
        self.batch += 1;
    }

    #[must_use]
    pub const fn is_uploading(&self) -> bool {
        !matches!(self.phase, UploadPhase::Idle)
    }

    /// Appends files to the queue.
    pub fn queue_files(&mut self, files: impl IntoIterator<Item = QueuedFile>) {
        self.queue.extend(files);
    }

    /// Removes a queued file. Refused while a batch is running.
    pub fn remove_file(&mut self, index: usize) -> bool {
        if self.is_uploading() || index >= self.queue.len() {
            return false;
        }
        self.queue.remove(index);
        self.error = None;
        true
    }

    /// Starts a batch, returning its id and the first index to encode.
    ///
    /// Returns `None` if the queue is empty or a batch is already running.
    pub fn begin(&mut self) -> Option<(u64, usize)> {
        if self.queue.is_empty() || self.is_uploading() {
            return None;
        }
        self.batch += 1;
        self.progress.clear();
        self.error = None;
        self.start_encoding(0);
        Some((self.batch, 0))
    }

    /// Records that file `index` was encoded.
    ///
    /// Returns `false` for stale or out-of-order responses.
    pub fn encoded(&mut self, batch: u64, index: usize) -> bool {
        if batch != self.batch || self.phase != (UploadPhase::Encoding { index }) {
            return false;
        }
        if self.progress.get(&index) != Some(&UploadStage::EncodeStarted) {
            return false;
        }
        self.progress.insert(index, UploadStage::EncodeDone);
        true
    }

    /// Moves an encoded file on to its write.
    ///
    /// Returns `false` unless `index` of `batch` has just been encoded.
    pub fn start_write(&mut self, batch: u64, index: usize) -> bool {
        if batch != self.batch
            || self.phase != (UploadPhase::Encoding { index })
            || self.progress.get(&index) != Some(&UploadStage::EncodeDone)
        {
            return false;
        }
        self.progress.insert(index, UploadStage::WriteStarted);
        self.phase = UploadPhase::Writing { index };
        true
    }

    /// Records that file `index` was written and advances the batch.
    pub fn written(&mut self, batch: u64, index: usize) -> UploadStep {
        if batch != self.batch || self.phase != (UploadPhase::Writing { index }) {
            return UploadStep::Stale;
        }
        self.progress.insert(index, UploadStage::WriteDone);

        let next = index + 1;
        if next < self.queue.len() {
            self.start_encoding(next);
            UploadStep::Next(next)
        } else {
            self.phase = UploadPhase::Idle;
            UploadStep::Complete
        }
    }

    /// Aborts the batch with the inline error. Returns `false` if stale.
    pub fn failed(&mut self, batch: u64) -> bool {
        if batch != self.batch || !self.is_uploading() {
            return false;
        }
        self.phase = UploadPhase::Idle;
        self.error = Some(UPLOAD_FAILED_MESSAGE.to_string());
        true
    }

    /// Progress percentage for a queued file, if its upload has started.
    #[must_use]
    pub fn percent(&self, index: usize) -> Option<u8> {
        self.progress.get(&index).map(|stage| stage.percent())
    }

    fn start_encoding(&mut self, index: usize) {
        self.phase = UploadPhase::Encoding { index };
        self.progress.insert(index, UploadStage::EncodeStarted);
    }
}
