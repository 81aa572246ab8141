//! Composable UI component renderers.
//!
//! # Components
//!
//! - `header`: Navigation bar and view title
//! - `table`: List layout with NAME, TYPE, SIZE, MODIFIED columns
//! - `grid`: Grid layout with file cards
//! - `empty`: Empty state message
//! - `upload`: Upload dialog with per-file progress
//!
//! Every component takes a [`Write`](std::io::Write) sink and display-ready
//! view-model parts, so components can be tested on a `Vec<u8>`.
//!
//! # Example
//!
//! ```rust
//! use drivedeck::ui::components::render_empty_state;
//! use drivedeck::ui::EmptyState;
//!
//! let mut out = Vec::new();
//! let empty = EmptyState { message: "Bin is empty".to_string() };
//! render_empty_state(&mut out, &empty, 20)?;
//! assert!(String::from_utf8_lossy(&out).contains("Bin is empty"));
//! # Ok::<(), std::io::Error>(())
//! ```

mod empty;
mod grid;
mod header;
mod table;
mod upload;

pub use empty::render_empty_state;
pub use grid::render_grid;
pub use header::render_header;
pub use table::{render_table_headers, render_table_rows};
pub use upload::render_upload_panel;
