//! Empty state renderer.
//!
//! Shown once the first snapshot has arrived and the current view has nothing
//! to list, either because the view is empty or because the search query
//! matched nothing.

use crate::ui::viewmodel::EmptyState;
use std::io::{self, Write};

/// Renders the empty state message centered in `cols` columns.
///
/// # Parameters
///
/// * `out` - Output sink
/// * `empty` - Message to show, e.g. `No files found matching "q"`
/// * `cols` - Terminal width used for centering
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn render_empty_state<W: Write>(out: &mut W, empty: &EmptyState, cols: usize) -> io::Result<()> {
    let padding = cols.saturating_sub(empty.message.chars().count()) / 2;
    writeln!(out)?;
    writeln!(out, "{}{}", " ".repeat(padding), empty.message)
}
