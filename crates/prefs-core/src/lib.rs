//! # prefs-core
//!
//! Shared library for preference persistence containing the property-list
//! document model, the XML and JSON container codecs, and the rules that map a
//! preference-set name to a file path.
//!
//! This crate has zero dependencies on the file system or process state: path
//! rules take the home and working directories as arguments, and codecs work
//! on byte slices.  The `prefs-store` crate wires these pieces to the OS.
//!
//! # Architecture overview
//!
//! - **`domain`** – The document tree ([`PreferenceDocument`], [`PrefDict`],
//!   [`PrefValue`], [`PrefDate`]) and the two independent selectors
//!   ([`ContentKind`], [`ContainerFormat`]).
//!
//! - **`codec`** – Encoding and decoding of a document as an XML property list
//!   (with the Apple DOCTYPE header) or as a JSON object mirroring the same
//!   tree.
//!
//! - **`path`** – Name validation and the storage path conventions for user
//!   preferences and local config files.

pub mod codec;
pub mod domain;
pub mod path;

pub use codec::{decode, encode, encode_with, EncodeOptions, FormatError};
pub use domain::document::{DateError, PrefDate, PrefDict, PrefValue, PreferenceDocument};
pub use domain::kinds::{ContainerFormat, ContentKind, OsFamily, UserPrefsLayout};
pub use path::PathResolutionError;
