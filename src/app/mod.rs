//! Application layer coordinating state, events, and actions.
//!
//! This module sits between the session runtime and the domain, store and
//! worker layers. It implements the event-driven flow that keeps the displayed
//! file list in sync with the document stream and the user's selections.
//!
//! # Architecture
//!
//! ```text
//! Commands / Snapshots → Events → Event Handler → State Mutations → Actions → Side Effects
//!                                      ↑                                         ↓
//!                                      └──────────── Worker Responses ───────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`handler`]: Event processing logic and state transition coordinator
//! - [`modes`]: View and layout selectors
//! - [`state`]: Drive state container, derivation and view model computation
//! - [`upload`]: Upload dialog and sequential batch state machine

pub mod actions;
pub mod handler;
pub mod modes;
pub mod state;
pub mod upload;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use modes::{Layout, View};
pub use state::{derive_files, DriveState, ViewState};
pub use upload::{QueuedFile, UploadDialog};
