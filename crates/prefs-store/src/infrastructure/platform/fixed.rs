//! Fixed platform for tests and cross-platform path previews.
//!
//! Returns whatever home directory, working directory and OS family it was
//! built with, without consulting the process environment.

use std::io;
use std::path::PathBuf;

use prefs_core::OsFamily;

use super::Platform;

/// A [`Platform`] with caller-supplied answers.
#[derive(Debug, Clone)]
pub struct FixedPlatform {
    home: Option<PathBuf>,
    cwd: Option<PathBuf>,
    os: OsFamily,
}

impl FixedPlatform {
    /// Creates a platform of the given family with no home or working directory.
    pub fn new(os: OsFamily) -> Self {
        Self {
            home: None,
            cwd: None,
            os,
        }
    }

    /// Sets the home directory.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Sets the working directory.
    pub fn with_current_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl Platform for FixedPlatform {
    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        self.cwd.clone().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no working directory configured")
        })
    }

    fn os_family(&self) -> OsFamily {
        self.os
    }
}
