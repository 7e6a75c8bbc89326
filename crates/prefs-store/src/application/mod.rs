//! Application layer for the preference store.
//!
//! Ties the pure `prefs_core` pieces (document model, codecs, path rules) to
//! the infrastructure adapters:
//!
//! - `config` – the serde/TOML description of how a store is set up.
//! - `store`  – [`store::PreferenceStore`], the load/save entry point.
//!
//! **Dependency rule**: this layer may depend on `prefs_core` and on the
//! `infrastructure` layer.

pub mod config;
pub mod store;
