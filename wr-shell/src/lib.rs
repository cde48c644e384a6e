pub mod axum_server;
pub mod cli;
pub mod commands;
pub mod console_view;
pub mod diagnostics;
pub mod error;
pub mod logger;

#[cfg(test)]
mod tests;

pub use axum_server::{AxumServer, AxumServerFactory, DEFAULT_READY_TIMEOUT, build_router};
pub use cli::{Cli, Commands};
pub use console_view::{ConsoleView, FALLBACK_HTML};
pub use error::{Result as ShellResult, ShellError};
