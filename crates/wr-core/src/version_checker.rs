//! Decides whether a bundle must be (re-)extracted.

use crate::{AssetError, AssetStore};

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

/// Outcome of comparing the packaged and extracted version markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    /// Both markers exist and are byte-for-byte equal
    UpToDate,
    /// No extracted marker (first run)
    Missing,
    /// Both markers exist but differ
    Mismatch { extracted: String, bundled: String },
    /// A marker exists but could not be read
    Unreadable { reason: String },
}

impl VersionCheck {
    pub const fn needs_extraction(&self) -> bool {
        !matches!(self, Self::UpToDate)
    }
}

pub struct VersionChecker {
    store: Arc<dyn AssetStore>,
    version_file: String,
}

impl VersionChecker {
    pub fn new(store: Arc<dyn AssetStore>, version_file: impl Into<String>) -> Self {
        Self {
            store,
            version_file: version_file.into(),
        }
    }

    /// Compare markers without touching the destination.
    ///
    /// Read failures never propagate; they become `Missing` or `Unreadable`
    /// and are logged with their cause.
    pub async fn inspect(&self, bundle: &str, dest: &Path) -> VersionCheck {
        let extracted_path = dest.join(&self.version_file);
        let extracted = match self.store.read_extracted_file(&extracted_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No extracted version marker at {}", extracted_path.display());
                return VersionCheck::Missing;
            }
            Err(e) => {
                let error = AssetError::version_read(&extracted_path, e);
                warn!("{}", describe_read_failure(&error));
                return VersionCheck::Unreadable {
                    reason: error.to_string(),
                };
            }
        };

        let bundled_path = format!("{bundle}/{}", self.version_file);
        let bundled = match self.store.read_bundled_file(&bundled_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let error = AssetError::version_read(&bundled_path, e);
                warn!("{}", describe_read_failure(&error));
                return VersionCheck::Unreadable {
                    reason: error.to_string(),
                };
            }
        };

        if extracted == bundled {
            VersionCheck::UpToDate
        } else {
            VersionCheck::Mismatch {
                extracted: marker_text(&extracted),
                bundled: marker_text(&bundled),
            }
        }
    }

    /// Compare markers and, when extraction is needed, clear the destination
    /// so the next extraction starts from an empty directory.
    pub async fn check(&self, bundle: &str, dest: &Path) -> VersionCheck {
        let result = self.inspect(bundle, dest).await;

        match &result {
            VersionCheck::UpToDate => {
                debug!("Assets for {bundle} are up to date");
                return result;
            }
            VersionCheck::Missing => info!("Assets for {bundle} have not been extracted yet"),
            VersionCheck::Mismatch { extracted, bundled } => {
                info!("Assets for {bundle} are stale (extracted {extracted}, bundled {bundled})")
            }
            VersionCheck::Unreadable { .. } => {
                info!("Assets for {bundle} could not be verified, re-extracting")
            }
        }

        if let Err(e) = self.store.remove_directory(dest).await {
            let error = AssetError::removal(dest, e);
            warn!("{error}");
        }

        result
    }

    pub async fn needs_extraction(&self, bundle: &str, dest: &Path) -> bool {
        self.check(bundle, dest).await.needs_extraction()
    }
}

fn describe_read_failure(error: &AssetError) -> String {
    match error.io_kind() {
        ErrorKind::PermissionDenied => format!("Version marker not readable (permission denied): {error}"),
        ErrorKind::NotFound => format!("Version marker missing: {error}"),
        _ => format!("Version marker read failed: {error}"),
    }
}

fn marker_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}
