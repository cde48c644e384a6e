//! Asset store over two plain directories: a read-only package root and a
//! writable root.

use crate::AssetStore;

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, warn};

const STAGING_SUFFIX: &str = ".partial";

#[derive(Debug, Clone)]
pub struct FsAssetStore {
    package_root: PathBuf,
    writable_root: PathBuf,
}

impl FsAssetStore {
    pub fn new(package_root: impl Into<PathBuf>, writable_root: impl Into<PathBuf>) -> Self {
        Self {
            package_root: package_root.into(),
            writable_root: writable_root.into(),
        }
    }

    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    pub fn writable_root(&self) -> &Path {
        &self.writable_root
    }

    /// Sibling directory the copy lands in before it is renamed into place.
    fn staging_path(dest: &Path) -> PathBuf {
        let mut name = dest
            .file_name()
            .map(|n| {
                let mut hidden = OsString::from(".");
                hidden.push(n);
                hidden
            })
            .unwrap_or_else(|| OsString::from(".bundle"));
        name.push(STAGING_SUFFIX);
        dest.with_file_name(name)
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn read_bundled_file(&self, bundle_path: &str) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.package_root.join(bundle_path)).await
    }

    async fn read_extracted_file(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn remove_directory(&self, path: &Path) -> std::io::Result<()> {
        match tokio::fs::remove_dir_all(path).await {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    /// Copy into a staging sibling, then rename over `dest`.
    ///
    /// A failed copy removes the staging directory, so `dest` is either the
    /// complete bundle or untouched.
    async fn copy_bundle_to_directory(&self, bundle: &str, dest: &Path) -> std::io::Result<()> {
        let source = self.package_root.join(bundle);
        if !tokio::fs::metadata(&source).await?.is_dir() {
            return Err(std::io::Error::new(
                ErrorKind::NotFound,
                format!("bundle {bundle} is not a directory"),
            ));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = Self::staging_path(dest);
        self.remove_directory(&staging).await?;

        if let Err(e) = copy_tree(&source, &staging).await {
            if let Err(cleanup) = self.remove_directory(&staging).await {
                warn!(
                    "Failed to clean up staging directory {}: {cleanup}",
                    staging.display()
                );
            }
            return Err(e);
        }

        self.remove_directory(dest).await?;
        tokio::fs::rename(&staging, dest).await?;
        debug!("Bundle {bundle} copied to {}", dest.display());

        Ok(())
    }

    fn resolve_writable_asset_path(&self, bundle: &str) -> PathBuf {
        self.writable_root.join(bundle)
    }

    fn resolve_bundled_asset_path(&self, bundle: &str) -> PathBuf {
        self.package_root.join(bundle)
    }
}

async fn copy_tree(source: &Path, dest: &Path) -> std::io::Result<()> {
    let mut pending = vec![(source.to_path_buf(), dest.to_path_buf())];

    while let Some((from, to)) = pending.pop() {
        tokio::fs::create_dir_all(&to).await?;

        let mut entries = tokio::fs::read_dir(&from).await?;
        while let Some(entry) = entries.next_entry().await? {
            let target = to.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                pending.push((entry.path(), target));
            } else {
                tokio::fs::copy(entry.path(), &target).await?;
            }
        }
    }

    Ok(())
}
