use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Platform access to packaged bundles and their extracted copies.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Read a file from the package, e.g. `webroot/version`.
    async fn read_bundled_file(&self, bundle_path: &str) -> std::io::Result<Vec<u8>>;

    /// Read a file from writable storage. Fails with `NotFound` when absent.
    async fn read_extracted_file(&self, path: &Path) -> std::io::Result<Vec<u8>>;

    /// Remove a directory tree. Removing a missing directory succeeds.
    async fn remove_directory(&self, path: &Path) -> std::io::Result<()>;

    async fn copy_bundle_to_directory(&self, bundle: &str, dest: &Path) -> std::io::Result<()>;

    fn resolve_writable_asset_path(&self, bundle: &str) -> PathBuf;

    /// Where the bundle can be served from without extraction, on platforms
    /// whose package store is directly addressable.
    fn resolve_bundled_asset_path(&self, bundle: &str) -> PathBuf;
}
