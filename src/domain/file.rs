//! File domain model and display helpers.
//!
//! This module defines [`FileRecord`], the read-only cached copy of a document
//! delivered by the store's change stream, along with the formatting used by
//! the list and grid views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binary unit step used when formatting sizes.
const BYTES_PER_UNIT: f64 = 1024.0;

/// Size units from smallest to largest.
const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// A file as cached from the document store.
///
/// # Fields
///
/// - `id`: Opaque identifier assigned by the store
/// - `name`: Display name (original file name)
/// - `mime_type`: MIME type string, possibly empty
/// - `size`: Size of the original content in bytes
/// - `upload_date`: Instant the client uploaded the file
/// - `data`: Encoded payload (`data:<mime>;base64,...`)
/// - `timestamp`: Server-assigned ordering instant, `None` while pending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub upload_date: DateTime<Utc>,
    pub data: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Coarse file category used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
    Document,
}

impl FileRecord {
    /// Returns `true` if the name contains `query_lower` as a substring.
    ///
    /// The caller lowercases the query once; the name is lowercased here so the
    /// match is case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// # use drivedeck::domain::FileRecord;
    /// # use chrono::Utc;
    /// let file = FileRecord {
    ///     id: "a".into(),
    ///     name: "MyPhoto.png".into(),
    ///     mime_type: "image/png".into(),
    ///     size: 10,
    ///     upload_date: Utc::now(),
    ///     data: String::new(),
    ///     timestamp: None,
    /// };
    /// assert!(file.name_matches("photo"));
    /// ```
    #[must_use]
    pub fn name_matches(&self, query_lower: &str) -> bool {
        self.name.to_lowercase().contains(query_lower)
    }

    /// Classifies the file for icon selection.
    #[must_use]
    pub fn kind(&self) -> FileKind {
        if self.mime_type.starts_with("image/") {
            FileKind::Image
        } else if self.mime_type.contains("pdf") {
            FileKind::Pdf
        } else {
            FileKind::Document
        }
    }

    /// Human-readable size, e.g. `"2 KB"` or `"1.5 MB"`.
    #[must_use]
    pub fn size_label(&self) -> String {
        format_size(self.size)
    }

    /// Upload date formatted as `"Jan 5, 2024"`.
    #[must_use]
    pub fn modified_label(&self) -> String {
        self.upload_date.format("%b %-d, %Y").to_string()
    }
}

/// Formats a byte count with binary units and at most two decimals.
///
/// # Examples
///
/// ```
/// use drivedeck::domain::file::format_size;
///
/// assert_eq!(format_size(0), "0 Bytes");
/// assert_eq!(format_size(2048), "2 KB");
/// assert_eq!(format_size(1536), "1.5 KB");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= BYTES_PER_UNIT && unit < SIZE_UNITS.len() - 1 {
        value /= BYTES_PER_UNIT;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(name: &str, mime_type: &str) -> FileRecord {
        FileRecord {
            id: "id".to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: 0,
            upload_date: Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
            data: String::new(),
            timestamp: None,
        }
    }

    #[test]
    fn name_match_ignores_case() {
        let file = record("MyPhoto.png", "image/png");
        assert!(file.name_matches("photo"));
        assert!(file.name_matches("myphoto.png"));
        assert!(!file.name_matches("xyz"));
    }

    #[test]
    fn kind_follows_mime_type() {
        assert_eq!(record("a.png", "image/png").kind(), FileKind::Image);
        assert_eq!(record("a.pdf", "application/pdf").kind(), FileKind::Pdf);
        assert_eq!(record("a.txt", "text/plain").kind(), FileKind::Document);
        assert_eq!(record("a", "").kind(), FileKind::Document);
    }

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(512), "512 Bytes");
        assert_eq!(format_size(2048), "2 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024 * 1024), "3072 GB");
    }

    #[test]
    fn modified_label_is_short_us_date() {
        assert_eq!(record("a", "").modified_label(), "Jan 5, 2024");
    }
}
