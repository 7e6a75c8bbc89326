//! Storage path conventions for preference sets.
//!
//! | ContentKind     | OS    | Nested layout                                 | Flat layout                              |
//! |-----------------|-------|-----------------------------------------------|------------------------------------------|
//! | LocalConfig     | any   | `$CWD/<name>.plist`                           | `$CWD/<name>.plist`                      |
//! | UserPreferences | macOS | `~/Library/Preferences/<name>.plist/<name>`   | `~/Library/Preferences/<name>.plist`     |
//! | UserPreferences | other | `~/<name>.plist/<name>`                       | `~/<name>.plist`                         |
//!
//! Everything here is pure: the home and working directories are passed in,
//! and nothing is created on disk.  Resolving the same inputs twice always
//! yields the same path.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::kinds::{OsFamily, UserPrefsLayout};

/// Extension appended to every preference-set name.
pub const PLIST_EXTENSION: &str = "plist";

/// Error type for path resolution.
#[derive(Debug, Error)]
pub enum PathResolutionError {
    /// The preference-set name could escape its directory or is unusable.
    #[error("invalid preference set name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// The user's home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDir,

    /// The current working directory could not be determined.
    #[error("could not determine current working directory: {0}")]
    NoWorkingDir(#[source] std::io::Error),
}

/// Checks that `name` is a single, safe file-name component.
///
/// # Errors
///
/// Returns [`PathResolutionError::InvalidName`] if `name` is empty, is `.`,
/// contains `..`, a path separator, or a NUL byte.
pub fn validate_name(name: &str) -> Result<(), PathResolutionError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name == "." {
        Some("name refers to the current directory")
    } else if name.contains("..") {
        Some("name contains `..`")
    } else if name.contains(|c: char| c == '/' || c == '\\') {
        Some("name contains a path separator")
    } else if name.contains('\0') {
        Some("name contains a NUL byte")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(PathResolutionError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// `<name>.plist`
pub fn plist_file_name(name: &str) -> String {
    format!("{name}.{PLIST_EXTENSION}")
}

/// The directory user preferences live in for the given OS family.
pub fn user_preferences_dir(home: &Path, os: OsFamily) -> PathBuf {
    match os {
        OsFamily::MacOs => home.join("Library").join("Preferences"),
        OsFamily::Other => home.to_path_buf(),
    }
}

/// Resolves the file path of a local config preference set.
///
/// # Errors
///
/// Returns [`PathResolutionError::InvalidName`] for unsafe names.
pub fn local_config_path(cwd: &Path, name: &str) -> Result<PathBuf, PathResolutionError> {
    validate_name(name)?;
    Ok(cwd.join(plist_file_name(name)))
}

/// Resolves the file path of a user preference set.
///
/// # Errors
///
/// Returns [`PathResolutionError::InvalidName`] for unsafe names.
pub fn user_preferences_path(
    home: &Path,
    os: OsFamily,
    layout: UserPrefsLayout,
    name: &str,
) -> Result<PathBuf, PathResolutionError> {
    validate_name(name)?;
    let base = user_preferences_dir(home, os).join(plist_file_name(name));
    Ok(match layout {
        UserPrefsLayout::Nested => base.join(name),
        UserPrefsLayout::Flat => base,
    })
}
