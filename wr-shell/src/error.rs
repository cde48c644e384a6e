use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Config error: {0}")]
    Config(#[from] wr_config::ConfigError),

    #[error("Asset error: {0}")]
    Asset(#[from] wr_core::AssetError),

    #[error("Server error: {0}")]
    Server(#[from] wr_core::ServerError),

    #[error("Failed to initialize logger: {message}")]
    Logger { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShellError>;
