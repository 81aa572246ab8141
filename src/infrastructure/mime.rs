//! MIME type guessing from file extensions.
//!
//! A browser reports a file's type when it is picked; on the command line the
//! type is inferred from the extension instead.

use std::path::Path;

/// Guesses the MIME type of `path` from its extension.
///
/// # Parameters
///
/// * `path` - File path; only the extension is inspected (case-insensitive)
///
/// # Returns
///
/// The first registered MIME type for the extension, or
/// `application/octet-stream` when the extension is unknown or missing.
///
/// # Examples
///
/// ```
/// use drivedeck::infrastructure::guess_mime_type;
/// use std::path::Path;
///
/// assert_eq!(guess_mime_type(Path::new("photo.JPG")), "image/jpeg");
/// assert_eq!(guess_mime_type(Path::new("archive.xyz")), "application/octet-stream");
/// ```
#[must_use]
pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}
