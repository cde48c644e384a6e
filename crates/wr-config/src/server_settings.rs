use crate::{
    ALLOWED_HOSTS, ConfigError, ConfigErrorResult, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_STOP_IN_BACKGROUND, MIN_PORT,
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    /// 0 lets the OS pick an ephemeral port
    pub port: u16,
    /// Stop the server while the app is in the background, restart on resume
    pub stop_in_background: bool,
    /// Raw engine-specific configuration appended verbatim
    pub extra_config: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
            stop_in_background: DEFAULT_STOP_IN_BACKGROUND,
            extra_config: None,
        }
    }
}

impl ServerSettings {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.port != 0 && self.port < MIN_PORT {
            return Err(ConfigError::server(format!(
                "server.port must be 0 (ephemeral) or >= {}, got {}",
                MIN_PORT, self.port
            )));
        }

        if !ALLOWED_HOSTS.contains(&self.host.as_str()) {
            return Err(ConfigError::server(format!(
                "server.host must be one of {:?}, got {}",
                ALLOWED_HOSTS, self.host
            )));
        }

        Ok(())
    }

    /// Origin a client would use for this bind address, when the port is fixed.
    pub fn expected_origin(&self) -> Option<String> {
        (self.port != 0).then(|| format!("http://{}:{}", self.host, self.port))
    }
}
