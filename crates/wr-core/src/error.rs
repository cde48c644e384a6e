use crate::ServerState;

use std::panic::Location;
use std::path::{Path, PathBuf};

use error_location::ErrorLocation;
use thiserror::Error;

/// Failures while inspecting or materializing asset bundles.
///
/// None of these stop a session: the coordinator logs them and still
/// attempts to start the server.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to read version marker at {path}: {source} {location}")]
    VersionRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to extract bundle {bundle} into {dest}: {source} {location}")]
    Extraction {
        bundle: String,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to remove directory {path}: {source} {location}")]
    Removal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl AssetError {
    #[track_caller]
    pub fn version_read(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::VersionRead {
            path: path.as_ref().to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn extraction(bundle: &str, dest: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Extraction {
            bundle: bundle.to_string(),
            dest: dest.as_ref().to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn removal(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Removal {
            path: path.as_ref().to_path_buf(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Underlying I/O error kind.
    pub fn io_kind(&self) -> std::io::ErrorKind {
        match self {
            Self::VersionRead { source, .. }
            | Self::Extraction { source, .. }
            | Self::Removal { source, .. } => source.kind(),
        }
    }

    /// Whether the failure is the plain absence of a file or directory.
    pub fn is_not_found(&self) -> bool {
        self.io_kind() == std::io::ErrorKind::NotFound
    }
}

pub type AssetResult<T> = std::result::Result<T, AssetError>;

/// Failures reported by a server handle.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source} {location}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Server startup failed: {message} {location}")]
    StartupFailed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Server failed to become ready within {timeout_secs}s {location}")]
    StartupTimeout {
        timeout_secs: u64,
        location: ErrorLocation,
    },

    #[error("Server is not running {location}")]
    NotRunning { location: ErrorLocation },

    #[error("Illegal state transition {from} -> {to} {location}")]
    InvalidTransition {
        from: ServerState,
        to: ServerState,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl ServerError {
    #[track_caller]
    pub fn bind(address: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            address: address.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn startup_failed(message: impl Into<String>) -> Self {
        Self::StartupFailed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn startup_timeout(timeout_secs: u64) -> Self {
        Self::StartupTimeout {
            timeout_secs,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_running() -> Self {
        Self::NotRunning {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_transition(from: ServerState, to: ServerState) -> Self {
        Self::InvalidTransition {
            from,
            to,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether this error is recoverable via retry
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StartupTimeout { .. } | Self::Bind { .. })
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Bind { .. } => {
                "Another application is using the configured port. \
                   Pick another port or use 0 for an ephemeral one."
            }
            Self::StartupTimeout { .. } => {
                "The server is taking too long to start. \
                   Try again or check the logs."
            }
            Self::InvalidTransition { .. } => {
                "The server was asked to do something its current state does not allow."
            }
            _ => "An unexpected error occurred. Please check the logs for details.",
        }
    }
}

impl From<std::io::Error> for ServerError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// An ordinal or label that names no server state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown server state: {0}")]
pub struct UnknownState(pub String);
