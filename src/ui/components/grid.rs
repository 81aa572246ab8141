//! Grid layout renderer: files as fixed-width cards, as many per line as fit.

use crate::ui::helpers::{kind_tag, pad};
use crate::ui::viewmodel::DisplayItem;
use std::io::{self, Write};

/// Width of one card in characters.
const CARD_WIDTH: usize = 24;

/// Spaces between neighbouring cards.
const GUTTER: usize = 2;

/// Renders items as cards of three lines: tag and star, name, size and date.
///
/// ```text
/// [pdf] *                   [img]
/// Report.pdf                photo.png
/// 8 Bytes · Mar 1, 2024     1.2 MB · Mar 2, 2024
/// ```
///
/// # Parameters
///
/// * `out` - Output sink
/// * `items` - Files in display order
/// * `cols` - Terminal width; at least one card is placed per line
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn render_grid<W: Write>(out: &mut W, items: &[DisplayItem], cols: usize) -> io::Result<()> {
    let per_line = (cols / (CARD_WIDTH + GUTTER)).max(1);
    let gutter = " ".repeat(GUTTER);

    for chunk in items.chunks(per_line) {
        let tags: Vec<String> = chunk
            .iter()
            .map(|item| {
                let star = if item.is_starred { " *" } else { "" };
                pad(&format!("{}{star}", kind_tag(item.kind)), CARD_WIDTH)
            })
            .collect();
        let names: Vec<String> = chunk.iter().map(|item| pad(&item.name, CARD_WIDTH)).collect();
        let details: Vec<String> = chunk
            .iter()
            .map(|item| pad(&format!("{} · {}", item.size_label, item.modified_label), CARD_WIDTH))
            .collect();

        for line in [tags, names, details] {
            writeln!(out, "{}", line.join(&gutter).trim_end())?;
        }
        writeln!(out)?;
    }
    Ok(())
}
