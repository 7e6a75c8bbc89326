//! Whole-file reads and writes for preference sets.
//!
//! Writes are not atomic: a failure part-way through can leave a truncated
//! file behind.  Newly created files get `mode` as their permission bits on
//! Unix regardless of the process umask; existing files keep theirs.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Permission bits for newly created preference files: `rw-r--r--`.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// A file-system failure tied to the path it happened on.
#[derive(Debug, Error)]
#[error("I/O error accessing {path}: {source}")]
pub struct StorageError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl StorageError {
    fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }

    /// `true` when the failure was a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}

/// Reads the whole file at `path`.
///
/// # Errors
///
/// Returns [`StorageError`] if the file is missing or unreadable.
pub fn read_file(path: &Path) -> Result<Vec<u8>, StorageError> {
    let bytes = fs::read(path).map_err(|e| StorageError::new(path, e))?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Replaces the contents of `path` with `bytes`.
///
/// Missing parent directories are created first.
///
/// # Errors
///
/// Returns [`StorageError`] carrying the directory or file path that failed.
pub fn write_file(path: &Path, bytes: &[u8], mode: u32) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.is_dir() {
            fs::create_dir_all(dir).map_err(|e| StorageError::new(dir, e))?;
            debug!("created directory {}", dir.display());
        }
    }

    let existed = path.exists();
    let mut file = open_for_write(path, mode).map_err(|e| StorageError::new(path, e))?;
    file.write_all(bytes).map_err(|e| StorageError::new(path, e))?;
    if !existed {
        apply_mode(path, mode).map_err(|e| StorageError::new(path, e))?;
    }
    debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(unix)]
fn open_for_write(path: &Path, mode: u32) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn open_for_write(path: &Path, _mode: u32) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

// `OpenOptions::mode` is filtered through the umask.
#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_returns_same_bytes() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.plist");

        // Act
        write_file(&path, b"hello", DEFAULT_FILE_MODE).unwrap();
        let bytes = read_file(&path).unwrap();

        // Assert
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_write_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b.plist").join("b");

        write_file(&path, b"x", DEFAULT_FILE_MODE).unwrap();

        assert!(dir.path().join("a").join("b.plist").is_dir());
        assert!(path.is_file());
    }

    #[test]
    fn test_write_truncates_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.plist");
        write_file(&path, b"a much longer first payload", DEFAULT_FILE_MODE).unwrap();

        write_file(&path, b"short", DEFAULT_FILE_MODE).unwrap();

        assert_eq!(read_file(&path).unwrap(), b"short");
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.plist");

        let err = read_file(&path).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.path, path);
    }

    #[test]
    fn test_write_fails_when_parent_is_a_file() {
        // Arrange: "blocker" is a regular file, so it cannot be a directory
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let path = blocker.join("prefs");

        // Act
        let err = write_file(&path, b"x", DEFAULT_FILE_MODE).unwrap_err();

        // Assert
        assert_eq!(err.path, blocker);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_gets_requested_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.plist");

        write_file(&path, b"x", DEFAULT_FILE_MODE).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_file_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.plist");
        write_file(&path, b"x", 0o600).unwrap();

        // Act
        write_file(&path, b"y", DEFAULT_FILE_MODE).unwrap();

        // Assert
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
