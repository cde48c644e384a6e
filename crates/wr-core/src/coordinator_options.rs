use wr_config::{AliasSettings, Config, ErrorLogSettings, ServerSettings};

const DEFAULT_VERSION_FILE: &str = "version";

/// Everything a coordinator needs to build sessions.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub bundle: String,
    pub version_file: String,
    /// The package store is not directly servable and must be copied out first
    pub assets_require_extraction: bool,
    pub server: ServerSettings,
    pub error_log: ErrorLogSettings,
    pub aliases: Vec<AliasSettings>,
}

impl CoordinatorOptions {
    pub fn new(bundle: impl Into<String>) -> Self {
        Self {
            bundle: bundle.into(),
            version_file: String::from(DEFAULT_VERSION_FILE),
            assets_require_extraction: true,
            server: ServerSettings::default(),
            error_log: ErrorLogSettings::default(),
            aliases: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            bundle: config.assets.bundle.clone(),
            version_file: config.assets.version_file.clone(),
            assets_require_extraction: config.assets.require_extraction,
            server: config.server.clone(),
            error_log: config.error_log,
            aliases: config.aliases.clone(),
        }
    }
}
