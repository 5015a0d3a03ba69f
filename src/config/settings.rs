//! Runtime settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every struct is `#[serde(default)]`, so a partial `settings.toml` only
//! overrides the keys it names.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::RuntimePaths;

// ---------------------------------------------------------------------------
// EngineBackend
// ---------------------------------------------------------------------------

/// Selects which [`AnalysisEngine`](crate::engine::AnalysisEngine)
/// implementation the loader constructs.
///
/// | Variant | Engine                                            |
/// |---------|---------------------------------------------------|
/// | Native  | Dynamic library loaded from the resource dir      |
/// | Fixed   | In-process stub returning a fixed cue sequence    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineBackend {
    Native,
    Fixed,
}

impl Default for EngineBackend {
    fn default() -> Self {
        Self::Native
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Settings for constructing the shared analysis engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which engine implementation to construct.
    pub backend: EngineBackend,
    /// Base directory for engine resources.  `None` means the install-relative
    /// default from [`RuntimePaths::resource_dir`].
    pub resource_dir: Option<PathBuf>,
    /// Library stem of the native engine (`"rhubarb"` → `librhubarb.so`,
    /// `rhubarb.dll`, `librhubarb.dylib`).
    pub library_name: String,
    /// Resource files that must exist under the resource dir before the
    /// native engine is initialised.
    pub required_resources: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: EngineBackend::default(),
            resource_dir: None,
            library_name: "rhubarb".into(),
            required_resources: vec![
                "acoustic-model.data".into(),
                "cmudict-en-us.dict".into(),
                "en-us.lm.bin".into(),
            ],
        }
    }
}

impl EngineConfig {
    /// The configured resource directory, or the install-relative default.
    pub fn resolved_resource_dir(&self) -> PathBuf {
        self.resource_dir
            .clone()
            .unwrap_or_else(|| RuntimePaths::new().resource_dir)
    }
}

// ---------------------------------------------------------------------------
// LipSyncConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level runtime configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use lip_sync::config::LipSyncConfig;
///
/// // Load (returns Default when file is missing)
/// let config = LipSyncConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LipSyncConfig {
    /// Analysis engine settings.
    pub engine: EngineConfig,
}

impl LipSyncConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(LipSyncConfig::default())` when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&RuntimePaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but logs and falls back to defaults when the
    /// file exists and cannot be read or parsed.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            log::warn!("config: failed to load settings.toml, using defaults: {e:#}");
            Self::default()
        })
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&RuntimePaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
