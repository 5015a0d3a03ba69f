//! Resource path resolution for engine construction.
//!
//! The engine asks for its data files by bare name during initialisation.
//! [`ResourceLocator::locate`] joins names with a known resource extension
//! onto the base directory and returns everything else untouched, so an
//! engine that mixes resource lookups with other paths keeps working.

use std::path::{Path, PathBuf};

use crate::engine::loader::EngineInitError;

/// File extensions that are resolved against the resource directory.
pub const RESOURCE_EXTENSIONS: &[&str] = &["data", "dict", "bin", "wasm"];

/// Maps requested resource names to absolute paths under one base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocator {
    base_dir: PathBuf,
}

impl ResourceLocator {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve `name` against the base directory when it carries a resource
    /// extension; pass it through unchanged otherwise.
    pub fn locate(&self, name: &str) -> PathBuf {
        if is_resource_name(name) {
            self.base_dir.join(name)
        } else {
            PathBuf::from(name)
        }
    }

    /// Path of the platform shared library for `library_name` inside the
    /// base directory.
    pub fn library_path(&self, library_name: &str) -> PathBuf {
        self.base_dir.join(libloading::library_filename(library_name))
    }

    /// Check every name in `required` resolves to an existing file.
    ///
    /// # Errors
    ///
    /// [`EngineInitError::ResourceMissing`] naming the first missing path.
    pub fn verify<S: AsRef<str>>(&self, required: &[S]) -> Result<(), EngineInitError> {
        for name in required {
            let path = self.locate(name.as_ref());
            if !path.is_file() {
                return Err(EngineInitError::ResourceMissing(
                    path.display().to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn is_resource_name(name: &str) -> bool {
    let path = Path::new(name);
    if path.is_absolute() {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| RESOURCE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resource_names_are_joined_onto_base_dir() {
        let locator = ResourceLocator::new("/opt/rhubarb");
        assert_eq!(
            locator.locate("cmudict-en-us.dict"),
            PathBuf::from("/opt/rhubarb/cmudict-en-us.dict")
        );
        assert_eq!(
            locator.locate("en-us.lm.bin"),
            PathBuf::from("/opt/rhubarb/en-us.lm.bin")
        );
        assert_eq!(
            locator.locate("rhubarb.wasm"),
            PathBuf::from("/opt/rhubarb/rhubarb.wasm")
        );
    }

    #[test]
    fn other_names_pass_through() {
        let locator = ResourceLocator::new("/opt/rhubarb");
        assert_eq!(locator.locate("rhubarb.js"), PathBuf::from("rhubarb.js"));
        assert_eq!(locator.locate("mdef"), PathBuf::from("mdef"));
        assert_eq!(
            locator.locate("/abs/model.data"),
            PathBuf::from("/abs/model.data")
        );
    }

    #[test]
    fn library_path_uses_platform_file_name() {
        let locator = ResourceLocator::new("/opt/rhubarb");
        let path = locator.library_path("rhubarb");
        assert_eq!(path.parent(), Some(Path::new("/opt/rhubarb")));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains("rhubarb")));
    }

    #[test]
    fn verify_reports_first_missing_resource() {
        let dir = tempdir().expect("temp dir");
        std::fs::write(dir.path().join("present.data"), b"x").unwrap();

        let locator = ResourceLocator::new(dir.path());
        assert!(locator.verify(&["present.data"]).is_ok());

        let err = locator
            .verify(&["present.data", "absent.dict"])
            .unwrap_err();
        match err {
            EngineInitError::ResourceMissing(path) => assert!(path.ends_with("absent.dict")),
            other => panic!("expected ResourceMissing, got {other:?}"),
        }
    }
}
