// src/storage/mod.rs

//! Snapshot persistence.
//!
//! A snapshot is one JSON document per `(region, category)` pair, replaced
//! whole on every successful refresh.
//!
//! ## Directory Structure
//!
//! ```text
//! {root}/
//! └── snapshots/
//!     ├── global/
//!     │   ├── updates.json
//!     │   └── notices.json
//!     └── jp/
//!         └── events.json
//! ```

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{ArticleRow, CategorySnapshot, SnapshotKey};
use crate::utils::clock::Clock;

pub use local::LocalStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;

/// Directory holding the snapshot documents.
pub const SNAPSHOT_DIR: &str = "snapshots";

/// Raw document backend.
///
/// `put` replaces the document at `path` as a whole; a reader sees either
/// the old bytes or the new ones.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document, `None` if it was never written.
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or fully replace a document.
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Paths of all documents under `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}

/// Relative document path for a snapshot key.
pub fn snapshot_path(key: &SnapshotKey) -> String {
    format!("{}/{}/{}.json", SNAPSHOT_DIR, key.region, key.category)
}

/// Inverse of [`snapshot_path`].
pub fn key_from_path(path: &str) -> Option<SnapshotKey> {
    let rest = path.strip_prefix(SNAPSHOT_DIR)?.strip_prefix('/')?;
    let (region, file) = rest.split_once('/')?;
    let category = file.strip_suffix(".json")?;
    if region.is_empty() || category.is_empty() || category.contains('/') {
        return None;
    }
    Some(SnapshotKey::new(region, category))
}

/// Load/save of category snapshots on top of a [`DocumentStore`].
#[derive(Clone)]
pub struct CategorySnapshotStore {
    backend: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl CategorySnapshotStore {
    pub fn new(backend: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Where snapshots are stored.
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Load the snapshot for `key`; `Ok(None)` if none was ever saved.
    pub async fn load(&self, key: &SnapshotKey) -> Result<Option<CategorySnapshot>> {
        let path = snapshot_path(key);
        let Some(bytes) = self
            .backend
            .get(&path)
            .await
            .map_err(|e| AppError::storage(key.to_string(), e))?
        else {
            return Ok(None);
        };

        let snapshot: CategorySnapshot = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::storage(key.to_string(), format!("corrupt snapshot: {}", e)))?;
        if snapshot.key().as_ref() != Some(key) {
            return Err(AppError::storage(
                key.to_string(),
                format!("document holds snapshot {}", snapshot.category),
            ));
        }
        Ok(Some(snapshot))
    }

    /// Replace the snapshot for `key` with `rows`, stamping `updatedAt` now.
    pub async fn save(&self, key: &SnapshotKey, rows: Vec<ArticleRow>) -> Result<CategorySnapshot> {
        let snapshot = CategorySnapshot::new(key, rows, self.clock.now());
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        self.backend
            .put(&snapshot_path(key), &bytes)
            .await
            .map_err(|e| AppError::storage(key.to_string(), e))?;

        log::info!(
            "Saved snapshot {} ({} rows) to {}",
            key,
            snapshot.len(),
            self.backend.location()
        );
        Ok(snapshot)
    }

    /// Keys of every stored snapshot, sorted.
    pub async fn keys(&self) -> Result<Vec<SnapshotKey>> {
        let paths = self
            .backend
            .list(SNAPSHOT_DIR)
            .await
            .map_err(|e| AppError::storage(SNAPSHOT_DIR, e))?;

        let mut keys: Vec<SnapshotKey> = paths.iter().filter_map(|p| key_from_path(p)).collect();
        keys.sort_by(|a, b| (&a.region, &a.category).cmp(&(&b.region, &b.category)));
        Ok(keys)
    }
}
