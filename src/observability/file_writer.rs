//! Size-rotated append-only file writer for span export.
//!
//! When the active file grows past the size limit it is shifted to `<name>.1`,
//! older backups move up one number (`.1` to `.2`, and so on) and the oldest
//! beyond the retention count is dropped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Rotation threshold (10 MB).
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Backups kept after rotation.
pub const DEFAULT_BACKUPS: usize = 3;

/// Thread-safe rotating line writer.
///
/// The file is opened lazily on the first write, so construction never fails.
/// The handle is kept open between writes and dropped before a rotation.
pub struct FileWriter {
    /// Active file; backups are `<file_path>.1` through `<file_path>.N`.
    file_path: PathBuf,
    /// Size above which the next write rotates first.
    max_bytes: u64,
    /// Number of backups kept; `0` truncates instead of rotating.
    backups: usize,
    /// Open handle, `None` until the first write and after a rotation.
    file: Mutex<Option<File>>,
}

impl FileWriter {
    /// Creates a writer with the default limits (10 MB, three backups).
    ///
    /// # Parameters
    ///
    /// * `file_path` - Path of the active trace file
    ///
    /// # Example
    ///
    /// ```ignore
    /// let writer = FileWriter::new(PathBuf::from("/tmp/spans.json"));
    /// writer.write_line(r#"{"resourceSpans":[]}"#)?;
    /// ```
    pub fn new(file_path: PathBuf) -> Self {
        Self::with_limits(file_path, DEFAULT_MAX_BYTES, DEFAULT_BACKUPS)
    }

    /// Creates a writer with explicit rotation limits.
    ///
    /// # Parameters
    ///
    /// * `file_path` - Path of the active trace file
    /// * `max_bytes` - Size threshold that triggers rotation
    /// * `backups` - How many rotated files to keep
    pub const fn with_limits(file_path: PathBuf, max_bytes: u64, backups: usize) -> Self {
        Self {
            file_path,
            max_bytes,
            backups,
            file: Mutex::new(None),
        }
    }

    /// Appends `line` plus a newline, rotating first if the file is too big.
    ///
    /// # Errors
    ///
    /// Returns an error if rotation, opening or writing fails, or if the lock
    /// was poisoned by a panicking writer.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("writer lock poisoned: {e}")))?;

        let too_big = fs::metadata(&self.file_path).is_ok_and(|meta| meta.len() > self.max_bytes);
        if too_big {
            *guard = None;
            self.rotate()?;
        }

        let file = match guard.take() {
            Some(file) => file,
            None => OpenOptions::new().create(true).append(true).open(&self.file_path)?,
        };
        let file = guard.insert(file);

        writeln!(file, "{line}")?;
        file.flush()
    }

    /// Path of backup `number`, e.g. `spans.json.2`.
    fn backup_path(&self, number: usize) -> PathBuf {
        let mut name = self.file_path.as_os_str().to_owned();
        name.push(format!(".{number}"));
        PathBuf::from(name)
    }

    /// Shifts every backup up one number and moves the active file to `.1`.
    ///
    /// The backup beyond the retention count is deleted first, so at most
    /// `backups` rotated files exist afterwards.
    fn rotate(&self) -> io::Result<()> {
        if self.backups == 0 {
            return remove_if_exists(&self.file_path);
        }

        remove_if_exists(&self.backup_path(self.backups))?;
        for number in (1..self.backups).rev() {
            let from = self.backup_path(number);
            if from.exists() {
                fs::rename(&from, self.backup_path(number + 1))?;
            }
        }
        fs::rename(&self.file_path, self.backup_path(1))
    }
}

/// Removes `path`, treating a missing file as success.
fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("file_path", &self.file_path)
            .field("max_bytes", &self.max_bytes)
            .field("backups", &self.backups)
            .finish_non_exhaustive()
    }
}
