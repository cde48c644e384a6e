#![allow(dead_code)]

use wr_core::{AssetStore, CoordinatorOptions, FsAssetStore};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

pub const BUNDLE: &str = "webroot";
pub const VERSION_FILE: &str = "version";

/// A package root holding one bundle, plus an empty writable root.
pub struct BundleFixture {
    pub temp: TempDir,
    pub store: Arc<FsAssetStore>,
}

impl BundleFixture {
    /// Bundle with a version marker, an index page and a nested stylesheet.
    pub fn new(version: &str) -> Self {
        let fixture = Self::empty();
        fixture.write_bundled(VERSION_FILE, version);
        fixture.write_bundled("index.html", "<h1>hello</h1>");
        fixture.write_bundled("css/site.css", "body { margin: 0 }");
        fixture
    }

    /// No bundle in the package root at all.
    pub fn empty() -> Self {
        let temp = TempDir::new().unwrap();
        let package_root = temp.path().join("package");
        let writable_root = temp.path().join("data");
        fs::create_dir_all(&package_root).unwrap();
        fs::create_dir_all(&writable_root).unwrap();

        Self {
            store: Arc::new(FsAssetStore::new(package_root, writable_root)),
            temp,
        }
    }

    pub fn store(&self) -> Arc<dyn AssetStore> {
        self.store.clone()
    }

    pub fn package_dir(&self) -> PathBuf {
        self.store.resolve_bundled_asset_path(BUNDLE)
    }

    pub fn dest(&self) -> PathBuf {
        self.store.resolve_writable_asset_path(BUNDLE)
    }

    pub fn write_bundled(&self, relative: &str, contents: &str) {
        write(&self.package_dir().join(relative), contents);
    }

    pub fn write_extracted(&self, relative: &str, contents: &str) {
        write(&self.dest().join(relative), contents);
    }

    pub fn read_extracted(&self, relative: &str) -> Option<String> {
        fs::read_to_string(self.dest().join(relative)).ok()
    }

    /// Options for this bundle on an ephemeral port.
    pub fn options(&self) -> CoordinatorOptions {
        let mut options = CoordinatorOptions::new(BUNDLE);
        options.version_file = VERSION_FILE.to_string();
        options.server.port = 0;
        options
    }
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}
