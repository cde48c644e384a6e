use wr_config::Config;
use wr_shell::{Cli, Commands, ShellResult, commands, logger};

use std::process::ExitCode;

use clap::Parser;
use log::info;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ShellResult<()> {
    if cli.command == Commands::States {
        return commands::states();
    }

    dotenvy::dotenv().ok();

    // Load and validate configuration
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => Config::config_dir()?,
    };
    let config = Config::load_from(&config_dir)?;
    config.validate()?;

    // Initialize logger (before any other logging)
    logger::initialize(
        config.logging.level,
        config.log_file_path(&config_dir),
        config.logging.colored,
    )?;

    info!("Starting wr-shell v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    commands::run(&cli.command, &config).await
}
