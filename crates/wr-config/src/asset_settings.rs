use crate::{
    APP_DIR_NAME, ConfigError, ConfigErrorResult, DEFAULT_BUNDLE, DEFAULT_PACKAGE_DIR,
    DEFAULT_REQUIRE_EXTRACTION, DEFAULT_VERSION_FILE, DEFAULT_WRITABLE_SUBDIR,
};

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Bundle name, a directory directly under `package_dir`
    pub bundle: String,
    /// Read-only package store holding the bundles
    pub package_dir: PathBuf,
    /// Writable root for extracted copies. None = platform data directory
    pub writable_dir: Option<PathBuf>,
    /// Version marker file at the bundle root
    pub version_file: String,
    /// Whether the package store must be copied out before it can be served
    pub require_extraction: bool,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            bundle: String::from(DEFAULT_BUNDLE),
            package_dir: PathBuf::from(DEFAULT_PACKAGE_DIR),
            writable_dir: None,
            version_file: String::from(DEFAULT_VERSION_FILE),
            require_extraction: DEFAULT_REQUIRE_EXTRACTION,
        }
    }
}

impl AssetSettings {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !is_single_segment(&self.bundle) {
            return Err(ConfigError::assets(format!(
                "assets.bundle must be a single non-empty path segment, got {:?}",
                self.bundle
            )));
        }

        if !is_relative_file(&self.version_file) {
            return Err(ConfigError::assets(format!(
                "assets.version_file must be a relative path inside the bundle, got {:?}",
                self.version_file
            )));
        }

        Ok(())
    }

    /// Resolve the writable root, falling back to the platform data directory.
    pub fn writable_root(&self) -> ConfigErrorResult<PathBuf> {
        if let Some(ref dir) = self.writable_dir {
            return Ok(dir.clone());
        }

        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR_NAME).join(DEFAULT_WRITABLE_SUBDIR))
            .ok_or(ConfigError::NoDataDir)
    }
}

fn is_single_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn is_relative_file(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
