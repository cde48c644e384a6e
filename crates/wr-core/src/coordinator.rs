//! Builds server sessions and drives them through prepare and start.

use crate::{
    AssetExtractor, AssetStore, CoordinatorOptions, ServerConfig, ServerFactory, Session,
    VersionChecker,
};

use std::path::PathBuf;
use std::sync::Arc;

use log::info;

pub struct LifecycleCoordinator {
    options: CoordinatorOptions,
    assets: Arc<dyn AssetStore>,
    factory: Arc<dyn ServerFactory>,
}

impl LifecycleCoordinator {
    pub fn new(
        options: CoordinatorOptions,
        assets: Arc<dyn AssetStore>,
        factory: Arc<dyn ServerFactory>,
    ) -> Self {
        Self {
            options,
            assets,
            factory,
        }
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    /// Directory the server will serve: the extracted copy when the package
    /// store needs extraction, the package itself otherwise.
    pub fn served_dir(&self) -> PathBuf {
        if self.options.assets_require_extraction {
            self.assets.resolve_writable_asset_path(&self.options.bundle)
        } else {
            self.assets.resolve_bundled_asset_path(&self.options.bundle)
        }
    }

    pub fn version_checker(&self) -> VersionChecker {
        VersionChecker::new(self.assets.clone(), self.options.version_file.clone())
    }

    pub fn extractor(&self) -> AssetExtractor {
        AssetExtractor::new(self.assets.clone())
    }

    /// Build a session and its server handle without running anything.
    pub fn create_session(&self) -> Session {
        let config = ServerConfig::new(
            &self.options.server,
            self.options.error_log,
            &self.options.aliases,
            self.served_dir(),
        );
        let handle = self.factory.create(config.clone());

        let session = Session::new(
            config,
            handle,
            self.options.bundle.clone(),
            self.options.assets_require_extraction,
            self.version_checker(),
            self.extractor(),
        );

        info!(
            "Created session {} for server #{} serving {}",
            session.id(),
            session.server_id(),
            session.config().file_dir.display()
        );

        session
    }

    /// Create a session and run prepare/start on a background task.
    ///
    /// Must be called from within a Tokio runtime. The returned session can be
    /// disposed at any time; a start that completes afterwards publishes
    /// nothing.
    pub fn mount(&self) -> Session {
        let session = self.create_session();
        let runner = session.clone();
        tokio::spawn(async move {
            runner.run().await;
        });
        session
    }
}
