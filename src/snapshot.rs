//! Static navigation snapshot (tier 3)
//!
//! The snapshot is a JSON array of navigation items in exactly the shape the
//! hierarchical endpoint serves, so it can stand in for a live fetch.

use crate::error::NavError;
use crate::tree::NavItem;
use reqwest::Url;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where a configured snapshot lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    Remote(Url),
    File(PathBuf),
}

impl SnapshotSource {
    /// Classify a configured location.
    ///
    /// Absolute http(s) URLs are remote. Anything that exists on disk is a
    /// file. A remaining site-relative path (`/wiki-navigation.json`) is
    /// resolved against `site_url`.
    pub fn resolve(location: &str, site_url: &str) -> Result<Self, NavError> {
        if let Ok(url) = Url::parse(location) {
            return match url.scheme() {
                "http" | "https" => Ok(SnapshotSource::Remote(url)),
                "file" => url
                    .to_file_path()
                    .map(SnapshotSource::File)
                    .map_err(|_| NavError::Snapshot {
                        location: location.to_string(),
                        message: "not a local file URL".to_string(),
                    }),
                other => Err(NavError::Snapshot {
                    location: location.to_string(),
                    message: format!("unsupported scheme '{}'", other),
                }),
            };
        }

        let path = Path::new(location);
        if path.exists() || !location.starts_with('/') {
            return Ok(SnapshotSource::File(path.to_path_buf()));
        }
        crate::query::resolve_endpoint(site_url, location).map(SnapshotSource::Remote)
    }
}

/// Parse snapshot bytes. `location` is only used for error messages.
pub fn read_snapshot(bytes: &[u8], location: &str) -> Result<Vec<NavItem>, NavError> {
    serde_json::from_slice(bytes).map_err(|e| NavError::Snapshot {
        location: location.to_string(),
        message: e.to_string(),
    })
}

/// Writes a top-level tree as a snapshot file
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `items` as pretty JSON; an empty tree writes `[]`.
    ///
    /// The file is written next to its destination and renamed into place.
    pub fn write(&self, items: &[NavItem]) -> Result<usize, NavError> {
        let snapshot_err = |message: String| NavError::Snapshot {
            location: self.path.display().to_string(),
            message,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| snapshot_err(e.to_string()))?;
        }

        let json = serde_json::to_vec_pretty(items).map_err(|e| snapshot_err(e.to_string()))?;
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        std::fs::write(&staging, &json).map_err(|e| snapshot_err(e.to_string()))?;
        std::fs::rename(&staging, &self.path).map_err(|e| snapshot_err(e.to_string()))?;

        info!(path = %self.path.display(), items = items.len(), bytes = json.len(), "Wrote navigation snapshot");
        Ok(json.len())
    }
}
