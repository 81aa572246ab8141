//! Filesystem locations used by drivedeck.
//!
//! The data directory holds the local document store (`drive.json`) and the
//! trace export file (`drivedeck-otlp.json`).

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "DRIVEDECK_DATA_DIR";

/// Returns the data directory for drivedeck storage.
///
/// Resolution order:
/// 1. `DRIVEDECK_DATA_DIR`
/// 2. `$XDG_DATA_HOME/drivedeck`
/// 3. `$HOME/.local/share/drivedeck`
/// 4. `./.drivedeck`
#[must_use]
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("drivedeck");
    }
    std::env::var_os("HOME").filter(|v| !v.is_empty()).map_or_else(
        || PathBuf::from(".drivedeck"),
        |home| PathBuf::from(home).join(".local").join("share").join("drivedeck"),
    )
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a tilde, or a missing `HOME`, are returned unchanged.
///
/// # Examples
///
/// ```
/// use drivedeck::infrastructure::expand_tilde;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let Some(home) = std::env::var_os("HOME") else {
        return PathBuf::from(path);
    };
    if path == "~" {
        PathBuf::from(home)
    } else if let Some(rest) = path.strip_prefix("~/") {
        Path::new(&home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Returns the final path component as a display name.
#[must_use]
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy().into_owned(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_last_component() {
        assert_eq!(file_name_of(Path::new("/tmp/docs/Report.pdf")), "Report.pdf");
        assert_eq!(file_name_of(Path::new("notes.txt")), "notes.txt");
    }

    #[test]
    fn absolute_paths_are_not_expanded() {
        assert_eq!(expand_tilde("/srv/files"), PathBuf::from("/srv/files"));
        assert_eq!(expand_tilde("relative/~"), PathBuf::from("relative/~"));
    }
}
