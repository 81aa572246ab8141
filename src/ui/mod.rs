//! User interface rendering layer.
//!
//! ```text
//! DriveState → compute_viewmodel → UIViewModel → render → text output
//! ```
//!
//! # Modules
//!
//! - [`viewmodel`]: View model types representing renderable UI state
//! - [`renderer`]: Top-level rendering coordinator
//! - [`components`]: Header, list, grid, empty state and upload dialog renderers
//! - [`helpers`]: Column fitting and shared rendering utilities

pub mod components;
pub mod helpers;
pub mod renderer;
pub mod viewmodel;

pub use renderer::{render, render_viewmodel};
pub use viewmodel::{
    DisplayItem, EmptyState, FileAction, HeaderInfo, SidebarEntry, UIViewModel, UploadPanel, UploadRow,
};
