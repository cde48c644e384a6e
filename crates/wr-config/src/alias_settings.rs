use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

/// Maps a URL prefix onto a directory.
///
/// Relative `path` values resolve against the served directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AliasSettings {
    pub url: String,
    pub path: String,
}

impl AliasSettings {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !self.url.starts_with('/') || self.url.trim_end_matches('/').is_empty() {
            return Err(ConfigError::alias(format!(
                "alias url must start with '/' and not be the root, got {:?}",
                self.url
            )));
        }

        if self.path.trim().is_empty() {
            return Err(ConfigError::alias(format!(
                "alias {} has an empty path",
                self.url
            )));
        }

        Ok(())
    }
}
