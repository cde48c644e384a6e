mod alias_settings;
mod asset_settings;
mod config;
mod error;
mod error_log_settings;
mod log_level;
mod logging_settings;
mod server_settings;

#[cfg(test)]
mod tests;

pub use alias_settings::AliasSettings;
pub use asset_settings::AssetSettings;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use error_log_settings::ErrorLogSettings;
pub use log_level::LogLevel;
pub use logging_settings::LoggingSettings;
pub use server_settings::ServerSettings;

const CONFIG_DIR_ENV: &str = "WR_CONFIG_DIR";
const CONFIG_DIR_NAME: &str = ".webroot";
const CONFIG_FILENAME: &str = "config.toml";
const APP_DIR_NAME: &str = "webroot";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STOP_IN_BACKGROUND: bool = true;
const DEFAULT_BUNDLE: &str = "webroot";
const DEFAULT_PACKAGE_DIR: &str = "assets";
const DEFAULT_WRITABLE_SUBDIR: &str = "assets";
const DEFAULT_VERSION_FILE: &str = "version";
const DEFAULT_REQUIRE_EXTRACTION: bool = true;
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_COLORED: bool = true;

const MIN_PORT: u16 = 1024;
const ALLOWED_HOSTS: [&str; 3] = ["127.0.0.1", "localhost", "0.0.0.0"];
