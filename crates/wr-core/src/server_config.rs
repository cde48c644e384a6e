use std::path::{Path, PathBuf};

use wr_config::{AliasSettings, ErrorLogSettings, ServerSettings};

/// A URL prefix served from a directory other than the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlAlias {
    pub url_prefix: String,
    pub directory: PathBuf,
}

/// What a server handle should do. Built once per session and never mutated
/// after the handle is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub hostname: String,
    /// 0 = ephemeral
    pub port: u16,
    pub file_dir: PathBuf,
    pub stop_in_background: bool,
    pub error_log: ErrorLogSettings,
    pub extra_config: Option<String>,
    pub aliases: Vec<UrlAlias>,
}

impl ServerConfig {
    pub fn new(
        settings: &ServerSettings,
        error_log: ErrorLogSettings,
        aliases: &[AliasSettings],
        file_dir: impl Into<PathBuf>,
    ) -> Self {
        let file_dir = file_dir.into();
        let aliases = aliases
            .iter()
            .map(|a| UrlAlias {
                url_prefix: normalize_prefix(&a.url),
                directory: resolve_alias_dir(&file_dir, &a.path),
            })
            .collect();

        Self {
            hostname: settings.host.clone(),
            port: settings.port,
            file_dir,
            stop_in_background: settings.stop_in_background,
            error_log,
            extra_config: settings.extra_config.clone(),
            aliases,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }

    pub const fn is_ephemeral_port(&self) -> bool {
        self.port == 0
    }
}

fn normalize_prefix(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Relative alias directories live under the served directory.
fn resolve_alias_dir(file_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else if path == Path::new(".") {
        file_dir.to_path_buf()
    } else {
        file_dir.join(path)
    }
}
