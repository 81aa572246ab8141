//! Header and navigation bar renderer.

use crate::ui::viewmodel::{HeaderInfo, SidebarEntry};
use std::io::{self, Write};

/// Renders the navigation bar followed by the view title.
///
/// The active view is bracketed:
///
/// ```text
/// [My Drive]  Starred  Recent  Bin
/// My Drive - Search results for "rep" (2)
/// ```
///
/// # Parameters
///
/// * `out` - Output sink
/// * `header` - Title (with the search suffix) and file count
/// * `sidebar` - Navigation entries in display order
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn render_header<W: Write>(out: &mut W, header: &HeaderInfo, sidebar: &[SidebarEntry]) -> io::Result<()> {
    let nav = sidebar
        .iter()
        .map(|entry| {
            if entry.is_active {
                format!("[{}]", entry.title)
            } else {
                entry.title.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{nav}")?;
    writeln!(out, "{} ({})", header.title, header.count)
}
