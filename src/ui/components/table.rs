//! List layout renderer: one row per file with NAME, TYPE, SIZE and
//! MODIFIED columns.

use crate::ui::helpers::{kind_tag, pad};
use crate::ui::viewmodel::DisplayItem;
use std::io::{self, Write};

/// Column widths in characters. MODIFIED takes the rest of the line.
const NAME_WIDTH: usize = 37;
const TYPE_WIDTH: usize = 24;
const SIZE_WIDTH: usize = 10;

/// Renders the column headers, aligned with the rows below.
///
/// # Parameters
///
/// * `out` - Output sink
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn render_table_headers<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "      {}{}{}{}",
        pad("NAME", NAME_WIDTH),
        pad("TYPE", TYPE_WIDTH),
        pad("SIZE", SIZE_WIDTH),
        "MODIFIED"
    )
}

/// Renders all rows.
///
/// # Parameters
///
/// * `out` - Output sink
/// * `items` - Files in display order
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn render_table_rows<W: Write>(out: &mut W, items: &[DisplayItem]) -> io::Result<()> {
    for item in items {
        render_table_row(out, item)?;
    }
    Ok(())
}

/// Row layout: `<star><tag> NAME TYPE SIZE MODIFIED`, with a `*` star marker
/// and a trailing `(deleting)` while a permanent delete is in flight.
fn render_table_row<W: Write>(out: &mut W, item: &DisplayItem) -> io::Result<()> {
    let star = if item.is_starred { '*' } else { ' ' };
    write!(
        out,
        "{star}{} {}{}{}{}",
        kind_tag(item.kind),
        pad(&item.name, NAME_WIDTH),
        pad(&item.mime_type, TYPE_WIDTH),
        pad(&item.size_label, SIZE_WIDTH),
        item.modified_label
    )?;
    if item.is_pending_delete {
        write!(out, " (deleting)")?;
    }
    writeln!(out)
}
