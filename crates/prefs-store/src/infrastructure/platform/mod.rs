//! Platform facts needed for path resolution.
//!
//! Resolving a preference path needs three things from the environment: the
//! user's home directory, the current working directory, and whether the
//! host is macOS.  The [`Platform`] trait bundles them so the store can be
//! pointed at a fake environment in tests.
//!
//! A [`fixed::FixedPlatform`] is always compiled (not test-only) so
//! integration tests and embedders can resolve paths for a platform other
//! than the host, e.g. the macOS layout on a Linux CI runner.

use std::path::PathBuf;

use prefs_core::OsFamily;

pub mod fixed;

/// Source of the environment facts used by path resolution.
#[cfg_attr(test, mockall::automock)]
pub trait Platform {
    /// The user's home directory, if it can be determined.
    fn home_dir(&self) -> Option<PathBuf>;

    /// The process working directory.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the directory is gone or
    /// unreadable.
    fn current_dir(&self) -> std::io::Result<PathBuf>;

    /// Which preferences-directory convention applies.
    fn os_family(&self) -> OsFamily;
}

/// The real environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPlatform;

impl Platform for SystemPlatform {
    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn current_dir(&self) -> std::io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn os_family(&self) -> OsFamily {
        OsFamily::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_platform_reports_compile_target_family() {
        assert_eq!(SystemPlatform.os_family(), OsFamily::current());
    }

    #[test]
    fn test_system_platform_current_dir_matches_std() {
        // Only meaningful when the test process has a working directory.
        if let Ok(expected) = std::env::current_dir() {
            assert_eq!(SystemPlatform.current_dir().unwrap(), expected);
        }
    }

    #[test]
    fn test_system_platform_home_dir_is_absolute_when_present() {
        // A stripped container may have no home directory; that is acceptable.
        if let Some(home) = SystemPlatform.home_dir() {
            assert!(home.is_absolute(), "home dir {home:?} must be absolute");
        }
    }
}
