//! Configuration module for the lip-sync runtime.
//!
//! Provides `LipSyncConfig` (top-level settings), `EngineConfig` for the
//! analysis engine, `RuntimePaths` for the config file and the
//! install-relative resource directory, and TOML persistence via
//! `LipSyncConfig::load` / `LipSyncConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::RuntimePaths;
pub use settings::{EngineBackend, EngineConfig, LipSyncConfig};
