use crate::{
    AliasSettings, AssetSettings, CONFIG_DIR_ENV, CONFIG_DIR_NAME, CONFIG_FILENAME, ConfigError,
    ConfigErrorResult, ErrorLogSettings, LoggingSettings, ServerSettings,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub assets: AssetSettings,
    pub error_log: ErrorLogSettings,
    pub aliases: Vec<AliasSettings>,
    pub logging: LoggingSettings,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for WR_CONFIG_DIR env var, else use ./.webroot/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply WR_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    /// Load from an explicit config directory, still applying env overrides.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: WR_CONFIG_DIR env var > ./.webroot/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(CONFIG_DIR_NAME))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.assets.validate()?;

        for alias in &self.aliases {
            alias.validate()?;
        }

        let mut urls: Vec<&str> = self
            .aliases
            .iter()
            .map(|a| a.url.trim_end_matches('/'))
            .collect();
        urls.sort_unstable();
        if let Some(pair) = urls.windows(2).find(|w| w[0] == w[1]) {
            return Err(ConfigError::alias(format!(
                "alias url {} is declared more than once",
                pair[0]
            )));
        }

        Ok(())
    }

    /// Absolute log file path, when file logging is configured.
    pub fn log_file_path(&self, config_dir: &Path) -> Option<PathBuf> {
        self.logging.file.as_ref().map(|f| config_dir.join(f))
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  server: {}:{} (stop in background: {})",
            self.server.host, self.server.port, self.server.stop_in_background
        );
        info!(
            "  assets: bundle={} package={} extraction={}",
            self.assets.bundle,
            self.assets.package_dir.display(),
            if self.assets.require_extraction {
                "required"
            } else {
                "not required"
            }
        );
        if let Some(ref dir) = self.assets.writable_dir {
            info!("  assets: writable={}", dir.display());
        }
        info!(
            "  error_log: {}",
            if self.error_log.any_enabled() {
                "enabled"
            } else {
                "disabled"
            }
        );
        for alias in &self.aliases {
            info!("  alias: {} => {}", alias.url, alias.path);
        }
        if self.server.extra_config.is_some() {
            info!("  extra_config: present");
        }
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("WR_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("WR_SERVER_PORT", &mut self.server.port);
        Self::apply_env_bool(
            "WR_STOP_IN_BACKGROUND",
            &mut self.server.stop_in_background,
        );
        Self::apply_env_option_string("WR_EXTRA_CONFIG", &mut self.server.extra_config);

        // Assets
        Self::apply_env_string("WR_ASSETS_BUNDLE", &mut self.assets.bundle);
        Self::apply_env_parse("WR_ASSETS_PACKAGE_DIR", &mut self.assets.package_dir);
        Self::apply_env_option_path("WR_ASSETS_WRITABLE_DIR", &mut self.assets.writable_dir);
        Self::apply_env_bool(
            "WR_ASSETS_REQUIRE_EXTRACTION",
            &mut self.assets.require_extraction,
        );
        Self::apply_env_string("WR_ASSETS_VERSION_FILE", &mut self.assets.version_file);

        // Logging
        Self::apply_env_parse("WR_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("WR_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("WR_LOG_FILE", &mut self.logging.file);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }

    fn apply_env_option_path(var_name: &str, target: &mut Option<PathBuf>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(PathBuf::from(val));
        }
    }
}
