//! prefs-store library entry point.
//!
//! Loads and saves property-list preference sets at the path the platform
//! convention dictates.  The document model and codecs live in `prefs-core`;
//! this crate adds the file system, the home/working directory lookups and
//! the store configuration.
//!
//! ```no_run
//! use prefs_store::{ContainerFormat, ContentKind, PreferenceStore};
//!
//! # fn main() -> Result<(), prefs_store::PrefsError> {
//! let mut store = PreferenceStore::new(ContentKind::UserPreferences, ContainerFormat::Xml);
//! store.document_mut().insert("Theme", "dark");
//! store.save("com.example.demo")?;
//! store.load("com.example.demo")?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod infrastructure;

pub use application::config::{ConfigError, StoreConfig};
pub use application::store::{PreferenceStore, PrefsError};
pub use infrastructure::platform::{fixed::FixedPlatform, Platform, SystemPlatform};

pub use prefs_core::{
    ContainerFormat, ContentKind, DateError, FormatError, OsFamily, PathResolutionError, PrefDate,
    PrefDict, PrefValue, PreferenceDocument, UserPrefsLayout,
};
