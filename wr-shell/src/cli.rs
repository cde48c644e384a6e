use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "wr-shell")]
#[command(about = "Serve a packaged web bundle from a local HTTP server")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (defaults to WR_CONFIG_DIR, then ./.webroot)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Extract the bundle if needed and serve it until Ctrl+C
    Serve,

    /// Report whether the extracted bundle is current, without changing it
    Check,

    /// Re-extract the bundle unconditionally
    Extract,

    /// Print the server state table as JSON
    States,
}
