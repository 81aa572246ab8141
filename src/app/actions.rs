//! Actions representing side effects to be executed by the session runtime.
//!
//! The event handler returns a `Vec<Action>` after processing each event,
//! allowing several side effects to be queued atomically. The runtime executes
//! them in order. Actions bridge pure state transformations and effectful
//! operations such as store writes or writing a downloaded file.
//!
//! # Example
//!
//! ```rust
//! use drivedeck::app::Action;
//! use drivedeck::worker::WorkerMessage;
//!
//! let actions = vec![Action::PostToWorker(WorkerMessage::delete_document("abc".to_string()))];
//! assert_eq!(actions.len(), 1);
//! ```

use crate::domain::FileRecord;
use crate::worker::WorkerMessage;
use std::path::PathBuf;

/// Commands representing side effects to be executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Posts a message to the background worker thread.
    PostToWorker(WorkerMessage),

    /// Decodes a file's payload and writes it under `destination`.
    ExportFile {
        file: FileRecord,
        /// Directory the file is written into, keeping its name.
        destination: PathBuf,
    },
}
