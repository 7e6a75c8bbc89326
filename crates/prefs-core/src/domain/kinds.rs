//! Configuration selectors for a preference store.
//!
//! [`ContentKind`] and [`ContainerFormat`] are independent: the content kind
//! only decides *where* a preference set lives, the container format only
//! decides *how* it is encoded.  Neither has a `Default` impl, so callers
//! always choose both explicitly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a preference set is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// User-scoped preferences under the platform preferences directory.
    UserPreferences,
    /// A config file in the current working directory.
    LocalConfig,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::UserPreferences => f.write_str("user preferences"),
            ContentKind::LocalConfig => f.write_str("local config"),
        }
    }
}

/// How a preference set is encoded on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// XML property list with the Apple DOCTYPE header.
    Xml,
    /// JSON object mirroring the property-list tree.
    Json,
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerFormat::Xml => f.write_str("XML"),
            ContainerFormat::Json => f.write_str("JSON"),
        }
    }
}

/// File layout for [`ContentKind::UserPreferences`].
///
/// `Nested` stores `<name>` inside a directory called `<name>.plist`, which is
/// where previously deployed versions of this store put their files.  `Flat`
/// stores a single `<name>.plist` file directly in the preferences directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserPrefsLayout {
    #[default]
    Nested,
    Flat,
}

/// Operating-system family, as far as path resolution cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    /// macOS: preferences live in `~/Library/Preferences`.
    MacOs,
    /// Everything else: preferences live directly in the home directory.
    Other,
}

impl OsFamily {
    /// The family of the platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else {
            OsFamily::Other
        }
    }
}
