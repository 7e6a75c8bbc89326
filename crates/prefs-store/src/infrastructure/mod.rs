//! Infrastructure layer for the preference store.
//!
//! Contains OS-facing adapters: home and working directory lookup, and
//! file-system reads and writes.
//!
//! **Dependency rule**: this layer may depend on `prefs_core`, but MUST NOT
//! import from the `application` layer.

pub mod platform;
pub mod storage;
