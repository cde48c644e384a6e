use crate::{AssetError, AssetResult, AssetStore};

use std::path::Path;
use std::sync::Arc;

use log::info;

/// Copies a packaged bundle onto writable storage.
pub struct AssetExtractor {
    store: Arc<dyn AssetStore>,
}

impl AssetExtractor {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self { store }
    }

    pub async fn extract(&self, bundle: &str, dest: &Path) -> AssetResult<()> {
        info!("Extracting bundle {bundle} to {}", dest.display());

        self.store
            .copy_bundle_to_directory(bundle, dest)
            .await
            .map_err(|e| AssetError::extraction(bundle, dest, e))?;

        info!("Extracted bundle {bundle}");
        Ok(())
    }
}
