//! TOML-described store configuration.
//!
//! An embedding application can keep its preference setup in a config file
//! instead of hard-coding it:
//!
//! ```toml
//! content_kind = "user_preferences"
//! container_format = "xml"
//! layout = "flat"
//! indent = 2
//! file_mode = 0o600
//! ```
//!
//! `content_kind` and `container_format` are required; everything else falls
//! back to the values a bare [`crate::PreferenceStore::new`] would use.

use std::path::{Path, PathBuf};

use prefs_core::{ContainerFormat, ContentKind, UserPrefsLayout};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::storage::file::DEFAULT_FILE_MODE;

/// Error type for store configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("I/O error accessing store config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse store config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How a [`crate::PreferenceStore`] resolves, encodes and writes files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    pub content_kind: ContentKind,
    pub container_format: ContainerFormat,
    /// Only consulted for [`ContentKind::UserPreferences`].
    #[serde(default)]
    pub layout: UserPrefsLayout,
    /// Spaces per nesting level in saved files.
    #[serde(default = "default_indent")]
    pub indent: usize,
    /// Permission bits for newly created files (Unix only).
    #[serde(default = "default_file_mode")]
    pub file_mode: u32,
}

fn default_indent() -> usize {
    prefs_core::codec::DEFAULT_INDENT
}

fn default_file_mode() -> u32 {
    DEFAULT_FILE_MODE
}

impl StoreConfig {
    /// A configuration with the given selectors and every other field at its
    /// default.
    pub fn new(content_kind: ContentKind, container_format: ContainerFormat) -> Self {
        Self {
            content_kind,
            container_format,
            layout: UserPrefsLayout::default(),
            indent: default_indent(),
            file_mode: default_file_mode(),
        }
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, unknown enum
    /// values, or missing required fields.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if its content is invalid.
    pub fn read_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
