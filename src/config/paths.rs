//! Runtime paths using the `dirs` crate and the executable's install location.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\lip-sync\
//!   macOS:   ~/Library/Application Support/lip-sync/
//!   Linux:   ~/.config/lip-sync/
//!
//! Resource dir (engine library + data files):
//!   `<directory of the running executable>/rhubarb/`, or
//!   `<local data dir>/lip-sync/rhubarb/` when the executable path is unknown.

use std::path::PathBuf;

/// Holds all resolved runtime directory/file paths.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Base directory the engine's auxiliary resources are resolved against.
    pub resource_dir: PathBuf,
}

impl RuntimePaths {
    const APP_NAME: &'static str = "lip-sync";
    const RESOURCE_SUBDIR: &'static str = "rhubarb";

    /// Resolves all paths.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard config path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");

        Self {
            config_dir,
            settings_file,
            resource_dir: Self::install_relative_resource_dir(),
        }
    }

    fn install_relative_resource_dir() -> PathBuf {
        let install_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()));

        match install_dir {
            Some(dir) => dir.join(Self::RESOURCE_SUBDIR),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(Self::APP_NAME)
                .join(Self::RESOURCE_SUBDIR),
        }
    }
}

impl Default for RuntimePaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = RuntimePaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .resource_dir
            .file_name()
            .is_some_and(|n| n == "rhubarb"));
    }

    #[test]
    fn resource_dir_is_absolute_next_to_executable() {
        let paths = RuntimePaths::new();
        let exe_dir = std::env::current_exe()
            .unwrap()
            .parent()
            .unwrap()
            .to_path_buf();
        assert_eq!(paths.resource_dir, exe_dir.join("rhubarb"));
    }
}
