//! Top-level rendering coordinator.
//!
//! The renderer follows a two-step process:
//!
//! 1. **View Model Computation**: Transform `DriveState` into `UIViewModel`
//! 2. **Component Rendering**: Delegate to specialized component renderers
//!
//! Output is plain text written to any [`Write`] sink, so the same code serves
//! the terminal and tests.
//!
//! # Example
//!
//! ```rust
//! use drivedeck::app::DriveState;
//! use drivedeck::ui::render;
//!
//! let state = DriveState::new();
//! let mut out = Vec::new();
//! render(&state, &mut out, 80)?;
//! assert!(String::from_utf8_lossy(&out).contains("Loading files..."));
//! # Ok::<(), std::io::Error>(())
//! ```

use crate::app::{DriveState, Layout};
use crate::ui::components;
use crate::ui::helpers::render_border;
use crate::ui::viewmodel::UIViewModel;
use std::io::{self, Write};

/// Renders the drive state into `out`, `cols` columns wide.
///
/// Computes a fresh view model and hands it to [`render_viewmodel`].
///
/// # Parameters
///
/// * `state` - Drive state to render
/// * `out` - Output sink
/// * `cols` - Terminal width used for borders, grid cells and centering
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn render<W: Write>(state: &DriveState, out: &mut W, cols: usize) -> io::Result<()> {
    let viewmodel = state.compute_viewmodel();
    render_viewmodel(&viewmodel, out, cols)
}

/// Renders a view model.
///
/// Layout: header, border, inline error, then the loading notice, the empty
/// state or the files in the selected layout, then the upload dialog if open.
///
/// # Parameters
///
/// * `vm` - View model, usually received from `Session::watch`
/// * `out` - Output sink
/// * `cols` - Terminal width
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn render_viewmodel<W: Write>(vm: &UIViewModel, out: &mut W, cols: usize) -> io::Result<()> {
    components::render_header(out, &vm.header, &vm.sidebar)?;
    render_border(out, cols)?;

    if let Some(error) = &vm.error {
        writeln!(out, "! {error}")?;
    }

    if vm.loading {
        writeln!(out, "Loading files...")?;
    } else if let Some(empty) = &vm.empty_state {
        components::render_empty_state(out, empty, cols)?;
    } else {
        match vm.layout {
            Layout::List => {
                components::render_table_headers(out)?;
                components::render_table_rows(out, &vm.display_items)?;
            }
            Layout::Grid => components::render_grid(out, &vm.display_items, cols)?,
        }
    }

    if let Some(panel) = &vm.upload {
        render_border(out, cols)?;
        components::render_upload_panel(out, panel)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{handle_event, Event, QueuedFile, View};
    use crate::domain::FileRecord;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, name: &str, mime_type: &str, size: u64) -> FileRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
        FileRecord {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size,
            upload_date: at,
            data: String::new(),
            timestamp: Some(at),
        }
    }

    fn rendered(state: &DriveState) -> String {
        let mut out = Vec::new();
        render(state, &mut out, 80).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn loaded_state() -> DriveState {
        let mut state = DriveState::new();
        let files = vec![
            record("a", "Report.pdf", "application/pdf", 2048),
            record("b", "photo.png", "image/png", 1536),
        ];
        handle_event(&mut state, &Event::SnapshotReceived { files }).unwrap();
        state
    }

    #[test]
    fn renders_list_rows() {
        let mut state = loaded_state();
        handle_event(&mut state, &Event::ToggleStar { id: "a".to_string() }).unwrap();
        let text = rendered(&state);

        assert!(text.contains("[My Drive]  Starred  Recent  Bin"));
        assert!(text.contains("My Drive (2)"));
        assert!(text.contains("NAME"));
        assert!(text.lines().any(|line| line.starts_with("*[pdf] Report.pdf") && line.contains("2 KB") && line.ends_with("Jan 5, 2024")));
        assert!(text.lines().any(|line| line.starts_with(" [img] photo.png") && line.contains("1.5 KB")));
    }

    #[test]
    fn renders_grid_cards() {
        let mut state = loaded_state();
        handle_event(&mut state, &Event::SetLayout(Layout::Grid)).unwrap();
        let text = rendered(&state);

        assert!(!text.contains("NAME"));
        assert!(text.contains("2 KB · Jan 5, 2024"));
        assert!(text.lines().any(|line| line.contains("Report.pdf") && line.contains("photo.png")));
    }

    #[test]
    fn renders_search_empty_state() {
        let mut state = loaded_state();
        handle_event(&mut state, &Event::SetSearchQuery("xyz".to_string())).unwrap();
        let text = rendered(&state);

        assert!(text.contains("My Drive - Search results for \"xyz\" (0)"));
        assert!(text.contains("No files found matching \"xyz\""));
    }

    #[test]
    fn renders_view_empty_messages() {
        let mut state = loaded_state();
        handle_event(&mut state, &Event::SetView(View::Bin)).unwrap();
        assert!(rendered(&state).contains("Bin is empty"));

        handle_event(&mut state, &Event::SetView(View::Starred)).unwrap();
        assert!(rendered(&state).contains("No starred files"));
    }

    #[test]
    fn renders_upload_dialog() {
        let mut state = loaded_state();
        handle_event(&mut state, &Event::OpenUploadDialog).unwrap();
        handle_event(&mut state, &Event::QueueFiles(vec![QueuedFile::new("/tmp/notes.txt", 5)])).unwrap();
        let text = rendered(&state);
        assert!(text.contains("notes.txt"));
        assert!(text.contains("[Upload 1 File]"));

        handle_event(&mut state, &Event::StartUpload).unwrap();
        let text = rendered(&state);
        assert!(text.contains("25%"));
        assert!(text.contains("(Uploading...)"));
    }
}
