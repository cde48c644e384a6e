use crate::axum_server::AxumServerFactory;
use crate::cli::Commands;
use crate::console_view::{ConsoleView, FALLBACK_HTML};
use crate::error::Result as ShellErrorResult;

use wr_config::Config;
use wr_core::{
    AssetError, AssetExtractor, AssetStore, CoordinatorOptions, FsAssetStore, LifecycleCoordinator,
    ServerState, VersionCheck, VersionChecker, bind_view,
};

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use serde_json::json;

const STOP_TIMEOUT: Duration = Duration::from_secs(15);

pub async fn run(command: &Commands, config: &Config) -> ShellErrorResult<()> {
    match command {
        Commands::Serve => serve(config).await,
        Commands::Check => check(config).await,
        Commands::Extract => extract(config).await,
        Commands::States => states(),
    }
}

pub fn asset_store(config: &Config) -> ShellErrorResult<FsAssetStore> {
    let writable_root = config.assets.writable_root()?;
    Ok(FsAssetStore::new(
        config.assets.package_dir.clone(),
        writable_root,
    ))
}

/// Mount a session on the axum engine and serve until Ctrl+C.
pub async fn serve(config: &Config) -> ShellErrorResult<()> {
    let store: Arc<dyn AssetStore> = Arc::new(asset_store(config)?);
    let coordinator = LifecycleCoordinator::new(
        CoordinatorOptions::from_config(config),
        store,
        Arc::new(AxumServerFactory::default()),
    );
    info!("Serving {}", coordinator.served_dir().display());

    let session = coordinator.mount();
    let view = bind_view(
        session.watch_origin(),
        Arc::new(ConsoleView::new()),
        FALLBACK_HTML,
    );

    tokio::signal::ctrl_c().await?;
    info!("Received SIGINT (Ctrl+C), shutting down");

    if let Some(stopping) = session.dispose()
        && tokio::time::timeout(STOP_TIMEOUT, stopping).await.is_err()
    {
        warn!(
            "Server did not stop within {}",
            humantime::format_duration(STOP_TIMEOUT)
        );
    }
    view.abort();

    Ok(())
}

/// Compare version markers and print the verdict. Never modifies the
/// extracted copy.
pub async fn check(config: &Config) -> ShellErrorResult<()> {
    let store = Arc::new(asset_store(config)?);
    let bundle = &config.assets.bundle;
    let dest = store.resolve_writable_asset_path(bundle);

    let report = if config.assets.require_extraction {
        let result = VersionChecker::new(store, config.assets.version_file.clone())
            .inspect(bundle, &dest)
            .await;
        json!({
            "bundle": bundle,
            "destination": dest.display().to_string(),
            "status": status_label(&result),
            "needs_extraction": result.needs_extraction(),
        })
    } else {
        json!({
            "bundle": bundle,
            "destination": store.resolve_bundled_asset_path(bundle).display().to_string(),
            "status": "served_in_place",
            "needs_extraction": false,
        })
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Remove the extracted copy and extract the bundle again.
pub async fn extract(config: &Config) -> ShellErrorResult<()> {
    let store = Arc::new(asset_store(config)?);
    let bundle = &config.assets.bundle;
    let dest = store.resolve_writable_asset_path(bundle);

    if !config.assets.require_extraction {
        warn!("assets.require_extraction is off, the extracted copy will not be served");
    }

    store
        .remove_directory(&dest)
        .await
        .map_err(|e| AssetError::removal(&dest, e))?;
    AssetExtractor::new(store).extract(bundle, &dest).await?;

    println!("{}", dest.display());
    Ok(())
}

pub fn states() -> ShellErrorResult<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&ServerState::table())?
    );
    Ok(())
}

pub fn status_label(check: &VersionCheck) -> &'static str {
    match check {
        VersionCheck::UpToDate => "up_to_date",
        VersionCheck::Missing => "missing",
        VersionCheck::Mismatch { .. } => "mismatch",
        VersionCheck::Unreadable { .. } => "unreadable",
    }
}
