//! Domain entities for preference persistence.
//!
//! This module contains the logical document tree and the configuration
//! selectors.  Nothing here touches the file system or knows how a document
//! is serialized: XML and JSON are two encodings of the same tree.

/// The preference document tree.
///
/// See [`document::PreferenceDocument`] for the main type.
pub mod document;

/// Content kind, container format, and platform selectors.
pub mod kinds;
