//! Shared rendering utilities.
//!
//! Widths are counted in characters, not bytes, so non-ASCII file names line
//! up with ASCII ones.

use crate::domain::FileKind;
use std::io::{self, Write};

/// Fits `text` into `width` characters, marking cut text with `...`.
///
/// # Parameters
///
/// * `text` - Text to fit
/// * `width` - Maximum width in characters
///
/// # Returns
///
/// `text` unchanged if it fits. Otherwise the first `width - 3` characters
/// followed by `...`, or a hard cut when `width` is three or less.
///
/// # Example
///
/// ```rust
/// use drivedeck::ui::helpers::truncate;
///
/// assert_eq!(truncate("quarterly-report.pdf", 10), "quarter...");
/// assert_eq!(truncate("a.txt", 10), "a.txt");
/// ```
#[must_use]
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= 3 {
        return text.chars().take(width).collect();
    }
    let mut cut: String = text.chars().take(width - 3).collect();
    cut.push_str("...");
    cut
}

/// Truncates and left-aligns `text` in a column of `width` characters.
///
/// # Parameters
///
/// * `text` - Cell contents
/// * `width` - Column width in characters
///
/// # Returns
///
/// A string exactly `width` characters long.
///
/// # Example
///
/// ```rust
/// use drivedeck::ui::helpers::pad;
///
/// assert_eq!(pad("a.txt", 8), "a.txt   ");
/// ```
#[must_use]
pub fn pad(text: &str, width: usize) -> String {
    let fitted = truncate(text, width);
    let fill = width.saturating_sub(fitted.chars().count());
    format!("{fitted}{}", " ".repeat(fill))
}

/// Short tag standing in for the file type icon.
///
/// # Returns
///
/// `[img]` for images, `[pdf]` for PDFs and `[doc]` for everything else.
#[must_use]
pub const fn kind_tag(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Image => "[img]",
        FileKind::Pdf => "[pdf]",
        FileKind::Document => "[doc]",
    }
}

/// Writes a horizontal rule spanning `cols` columns.
///
/// # Parameters
///
/// * `out` - Output sink
/// * `cols` - Width of the rule in characters
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn render_border<W: Write>(out: &mut W, cols: usize) -> io::Result<()> {
    writeln!(out, "{}", "─".repeat(cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_by_characters() {
        assert_eq!(truncate("ééééé", 5), "ééééé");
        assert_eq!(truncate("éééééé", 5), "éé...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }

    #[test]
    fn pads_to_width() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("abcdefgh", 6).chars().count(), 6);
    }
}
