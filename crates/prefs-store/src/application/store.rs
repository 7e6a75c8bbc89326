//! The preference store: one in-memory document bound to a content kind and a
//! container format.
//!
//! # Lifecycle
//!
//! ```text
//!   PreferenceStore::new(kind, format)      document = empty, version "1.0"
//!          │
//!          ├── load(name)  ── resolve ── read ── decode ──► document replaced
//!          │                    │         │        │
//!          │                    └─────────┴────────┴──► Err(..), document untouched
//!          │
//!          └── save(name)  ── resolve ── encode ── mkdir -p ── write
//! ```
//!
//! Path resolution is deterministic: `load` and `save` with the same name and
//! the same platform always touch the same file.  Names are validated before
//! the platform is consulted, so a rejected name never causes a home or
//! working directory lookup, let alone file-system access.

use std::path::PathBuf;

use prefs_core::codec::{self, EncodeOptions, FormatError};
use prefs_core::path::{self, PathResolutionError};
use prefs_core::{ContainerFormat, ContentKind, PreferenceDocument, UserPrefsLayout};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::config::StoreConfig;
use crate::infrastructure::platform::{Platform, SystemPlatform};
use crate::infrastructure::storage::file::{self, StorageError, DEFAULT_FILE_MODE};

/// Error type for [`PreferenceStore`] operations.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// Reading or writing the preference file failed.
    #[error("I/O error accessing preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content could not be decoded, or the document could not be
    /// encoded.
    #[error("preference format error: {0}")]
    Format(#[from] FormatError),

    /// The preference file path could not be determined.
    #[error("could not resolve preference path: {0}")]
    PathResolution(#[from] PathResolutionError),
}

impl From<StorageError> for PrefsError {
    fn from(err: StorageError) -> Self {
        PrefsError::Io {
            path: err.path,
            source: err.source,
        }
    }
}

/// Loads and saves one preference document.
///
/// The platform parameter supplies the home directory, working directory and
/// OS family; it defaults to the real process environment.
#[derive(Debug)]
pub struct PreferenceStore<P: Platform = SystemPlatform> {
    content_kind: ContentKind,
    container_format: ContainerFormat,
    layout: UserPrefsLayout,
    options: EncodeOptions,
    file_mode: u32,
    platform: P,
    document: PreferenceDocument,
}

impl PreferenceStore<SystemPlatform> {
    /// Creates a store with an empty document for the running platform.
    pub fn new(content_kind: ContentKind, container_format: ContainerFormat) -> Self {
        Self::with_platform(content_kind, container_format, SystemPlatform)
    }

    /// Creates a store for the running platform from a configuration.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::from_config_with_platform(config, SystemPlatform)
    }
}

impl<P: Platform> PreferenceStore<P> {
    /// Creates a store with an empty document that resolves paths through
    /// `platform`.
    pub fn with_platform(
        content_kind: ContentKind,
        container_format: ContainerFormat,
        platform: P,
    ) -> Self {
        Self {
            content_kind,
            container_format,
            layout: UserPrefsLayout::default(),
            options: EncodeOptions::default(),
            file_mode: DEFAULT_FILE_MODE,
            platform,
            document: PreferenceDocument::new(),
        }
    }

    /// Creates a store from a configuration that resolves paths through
    /// `platform`.
    pub fn from_config_with_platform(config: &StoreConfig, platform: P) -> Self {
        Self::with_platform(config.content_kind, config.container_format, platform)
            .with_layout(config.layout)
            .with_indent(config.indent)
            .with_file_mode(config.file_mode)
    }

    /// Selects the user-preferences file layout.
    pub fn with_layout(mut self, layout: UserPrefsLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the number of spaces per nesting level in saved files.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.options.indent = indent;
        self
    }

    /// Sets the permission bits for newly created files.
    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn content_kind(&self) -> ContentKind {
        self.content_kind
    }

    pub fn container_format(&self) -> ContainerFormat {
        self.container_format
    }

    pub fn layout(&self) -> UserPrefsLayout {
        self.layout
    }

    pub fn document(&self) -> &PreferenceDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut PreferenceDocument {
        &mut self.document
    }

    /// Replaces the in-memory document.  Nothing is written until
    /// [`save`](Self::save).
    pub fn set_document(&mut self, document: PreferenceDocument) {
        self.document = document;
    }

    pub fn into_document(self) -> PreferenceDocument {
        self.document
    }

    // ── Operations ────────────────────────────────────────────────────────────

    /// Returns the file path `load` and `save` use for `name`.
    ///
    /// Does not touch the file system.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::PathResolution`] for unsafe names or when the
    /// home or working directory cannot be determined.
    pub fn resolve_path(&self, name: &str) -> Result<PathBuf, PrefsError> {
        path::validate_name(name)?;
        let resolved = match self.content_kind {
            ContentKind::LocalConfig => {
                let cwd = self
                    .platform
                    .current_dir()
                    .map_err(PathResolutionError::NoWorkingDir)?;
                path::local_config_path(&cwd, name)?
            }
            ContentKind::UserPreferences => {
                let home = self
                    .platform
                    .home_dir()
                    .ok_or(PathResolutionError::NoHomeDir)?;
                path::user_preferences_path(&home, self.platform.os_family(), self.layout, name)?
            }
        };
        debug!(
            "resolved {} set {name:?} to {}",
            self.content_kind,
            resolved.display()
        );
        Ok(resolved)
    }

    /// Reads the preference set `name` and replaces the in-memory document.
    ///
    /// No directories are created.  On any error the in-memory document is
    /// left as it was.
    ///
    /// # Errors
    ///
    /// - [`PrefsError::PathResolution`] if the path cannot be resolved.
    /// - [`PrefsError::Io`] if the file is missing or unreadable.
    /// - [`PrefsError::Format`] if the content is not a valid document in the
    ///   selected container format.
    pub fn load(&mut self, name: &str) -> Result<(), PrefsError> {
        match self.read_document(name) {
            Ok(document) => {
                info!(
                    "loaded {} entries for {name:?} ({})",
                    document.dict.len(),
                    self.container_format
                );
                self.document = document;
                Ok(())
            }
            Err(e) => {
                warn!("failed to load preferences {name:?}: {e}");
                Err(e)
            }
        }
    }

    /// Writes the in-memory document to the preference set `name`.
    ///
    /// Missing parent directories are created.  The in-memory document is
    /// never modified.
    ///
    /// # Errors
    ///
    /// - [`PrefsError::PathResolution`] if the path cannot be resolved.
    /// - [`PrefsError::Format`] if the document cannot be encoded.
    /// - [`PrefsError::Io`] if a directory or the file cannot be written.
    pub fn save(&self, name: &str) -> Result<(), PrefsError> {
        let result = self.write_document(name);
        if let Err(e) = &result {
            warn!("failed to save preferences {name:?}: {e}");
        }
        result
    }

    fn read_document(&self, name: &str) -> Result<PreferenceDocument, PrefsError> {
        let path = self.resolve_path(name)?;
        let bytes = file::read_file(&path)?;
        Ok(codec::decode(&bytes, self.container_format)?)
    }

    fn write_document(&self, name: &str) -> Result<(), PrefsError> {
        let path = self.resolve_path(name)?;
        let bytes = codec::encode_with(&self.document, self.container_format, &self.options)?;
        file::write_file(&path, &bytes, self.file_mode)?;
        info!(
            "saved {} entries for {name:?} to {} ({})",
            self.document.dict.len(),
            path.display(),
            self.container_format
        );
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::platform::MockPlatform;
    use prefs_core::OsFamily;

    fn mac_platform(home: &'static str) -> MockPlatform {
        let mut platform = MockPlatform::new();
        platform
            .expect_home_dir()
            .returning(move || Some(PathBuf::from(home)));
        platform.expect_os_family().return_const(OsFamily::MacOs);
        platform
    }

    #[test]
    fn test_user_preferences_path_on_macos() {
        // Arrange
        let store = PreferenceStore::with_platform(
            ContentKind::UserPreferences,
            ContainerFormat::Xml,
            mac_platform("/Users/alice"),
        );

        // Act
        let path = store.resolve_path("demo").unwrap();

        // Assert
        assert_eq!(
            path,
            PathBuf::from("/Users/alice/Library/Preferences/demo.plist/demo")
        );
    }

    #[test]
    fn test_user_preferences_path_elsewhere() {
        let mut platform = MockPlatform::new();
        platform
            .expect_home_dir()
            .returning(|| Some(PathBuf::from("/home/bob")));
        platform.expect_os_family().return_const(OsFamily::Other);
        let store = PreferenceStore::with_platform(
            ContentKind::UserPreferences,
            ContainerFormat::Json,
            platform,
        );

        let path = store.resolve_path("demo").unwrap();

        assert_eq!(path, PathBuf::from("/home/bob/demo.plist/demo"));
    }

    #[test]
    fn test_flat_layout_drops_inner_file_name() {
        let store = PreferenceStore::with_platform(
            ContentKind::UserPreferences,
            ContainerFormat::Xml,
            mac_platform("/Users/alice"),
        )
        .with_layout(UserPrefsLayout::Flat);

        let path = store.resolve_path("demo").unwrap();

        assert_eq!(
            path,
            PathBuf::from("/Users/alice/Library/Preferences/demo.plist")
        );
    }

    #[test]
    fn test_local_config_path_uses_working_directory_only() {
        // Arrange: home and OS must not be consulted for local config
        let mut platform = MockPlatform::new();
        platform
            .expect_current_dir()
            .times(1)
            .returning(|| Ok(PathBuf::from("/tmp/work")));
        platform.expect_home_dir().times(0);
        platform.expect_os_family().times(0);
        let store = PreferenceStore::with_platform(
            ContentKind::LocalConfig,
            ContainerFormat::Xml,
            platform,
        );

        // Act
        let path = store.resolve_path("demo").unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/tmp/work/demo.plist"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let store = PreferenceStore::with_platform(
            ContentKind::UserPreferences,
            ContainerFormat::Xml,
            mac_platform("/Users/alice"),
        );

        assert_eq!(
            store.resolve_path("demo").unwrap(),
            store.resolve_path("demo").unwrap()
        );
    }

    #[test]
    fn test_traversal_name_rejected_before_platform_lookup() {
        // Arrange
        let mut platform = MockPlatform::new();
        platform.expect_home_dir().times(0);
        platform.expect_current_dir().times(0);
        platform.expect_os_family().times(0);
        let mut store = PreferenceStore::with_platform(
            ContentKind::UserPreferences,
            ContainerFormat::Xml,
            platform,
        );

        // Act
        let err = store.load("../../etc/passwd").unwrap_err();

        // Assert
        assert!(matches!(
            err,
            PrefsError::PathResolution(PathResolutionError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_missing_home_dir_is_path_resolution_error() {
        let mut platform = MockPlatform::new();
        platform.expect_home_dir().returning(|| None);
        platform.expect_os_family().return_const(OsFamily::Other);
        let store = PreferenceStore::with_platform(
            ContentKind::UserPreferences,
            ContainerFormat::Xml,
            platform,
        );

        let err = store.save("demo").unwrap_err();

        assert!(matches!(
            err,
            PrefsError::PathResolution(PathResolutionError::NoHomeDir)
        ));
    }

    #[test]
    fn test_missing_working_dir_is_path_resolution_error() {
        let mut platform = MockPlatform::new();
        platform
            .expect_current_dir()
            .returning(|| Err(std::io::Error::from(std::io::ErrorKind::NotFound)));
        let store = PreferenceStore::with_platform(
            ContentKind::LocalConfig,
            ContainerFormat::Json,
            platform,
        );

        let err = store.resolve_path("demo").unwrap_err();

        assert!(matches!(
            err,
            PrefsError::PathResolution(PathResolutionError::NoWorkingDir(_))
        ));
    }

    #[test]
    fn test_failed_load_keeps_document() {
        // Arrange: the resolved file does not exist
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_path_buf();
        let mut platform = MockPlatform::new();
        platform
            .expect_current_dir()
            .returning(move || Ok(cwd.clone()));
        let mut store = PreferenceStore::with_platform(
            ContentKind::LocalConfig,
            ContainerFormat::Xml,
            platform,
        );
        store.document_mut().insert("Theme", "dark");
        let before = store.document().clone();

        // Act
        let err = store.load("absent").unwrap_err();

        // Assert
        assert!(matches!(err, PrefsError::Io { .. }));
        assert_eq!(store.document(), &before);
    }

    #[test]
    fn test_from_config_applies_every_field() {
        // Arrange
        let config = StoreConfig {
            content_kind: ContentKind::UserPreferences,
            container_format: ContainerFormat::Json,
            layout: UserPrefsLayout::Flat,
            indent: 2,
            file_mode: 0o600,
        };

        // Act
        let store =
            PreferenceStore::from_config_with_platform(&config, mac_platform("/Users/alice"));

        // Assert
        assert_eq!(store.content_kind(), ContentKind::UserPreferences);
        assert_eq!(store.container_format(), ContainerFormat::Json);
        assert_eq!(store.layout(), UserPrefsLayout::Flat);
        assert_eq!(store.options.indent, 2);
        assert_eq!(store.file_mode, 0o600);
    }

    #[test]
    fn test_new_store_starts_with_empty_document() {
        let store = PreferenceStore::new(ContentKind::LocalConfig, ContainerFormat::Xml);

        assert!(store.document().dict.is_empty());
        assert_eq!(store.document().version, "1.0");
    }

    #[test]
    fn test_set_and_into_document() {
        let mut store = PreferenceStore::new(ContentKind::LocalConfig, ContainerFormat::Json);
        let mut doc = PreferenceDocument::new();
        doc.insert("Key", "Value");

        store.set_document(doc.clone());

        assert_eq!(store.into_document(), doc);
    }

    #[test]
    fn test_storage_error_maps_to_io_with_path() {
        let err = StorageError {
            path: PathBuf::from("/x/y"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };

        let mapped = PrefsError::from(err);

        match mapped {
            PrefsError::Io { path, source } => {
                assert_eq!(path, PathBuf::from("/x/y"));
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
