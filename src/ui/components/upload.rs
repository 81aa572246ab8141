//! Upload dialog renderer.

use crate::ui::helpers::pad;
use crate::ui::viewmodel::UploadPanel;
use std::io::{self, Write};

/// Renders the queued files with their progress, the inline error and the
/// upload button.
///
/// ```text
/// Upload files
///   notes.txt                      5 Bytes     100%
///   photo.png                      1.2 MB       25%
/// Failed to upload files. Please try again.
/// [Upload 2 Files]
/// ```
///
/// A disabled button (no files, or a batch in progress) is drawn in
/// parentheses instead of brackets.
///
/// # Parameters
///
/// * `out` - Output sink
/// * `panel` - Rows, button state and error of the open dialog
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn render_upload_panel<W: Write>(out: &mut W, panel: &UploadPanel) -> io::Result<()> {
    writeln!(out, "Upload files")?;
    for row in &panel.rows {
        let progress = row.progress.map_or_else(String::new, |percent| format!("{percent:>4}%"));
        writeln!(out, "  {}{}{progress}", pad(&row.name, 31), pad(&row.size_label, 12))?;
    }
    if let Some(error) = &panel.error {
        writeln!(out, "{error}")?;
    }
    if panel.button_enabled {
        writeln!(out, "[{}]", panel.button_label)
    } else {
        writeln!(out, "({})", panel.button_label)
    }
}
