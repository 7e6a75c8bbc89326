//! Storage infrastructure: preference file persistence.
//!
//! The `file` sub-module is a thin adapter over `std::fs`:
//!
//! - Reading a whole preference file into memory.
//! - Writing a whole preference file, creating missing parent directories and
//!   applying the configured permission bits to newly created files.
//!
//! Nothing here knows about containers or path conventions; callers hand in a
//! resolved path and encoded bytes.

pub mod file;
