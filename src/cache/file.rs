//! On-disk cache surviving process restarts
//!
//! Layout: `<dir>/<first two hex chars>/<hex digest>.json`. Each file holds
//! the serialized result (image as base64) plus a creation timestamp.
//! Entries are written to a temp file and renamed into place.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::{CacheKey, ResultCache};
use crate::error::{AppError, Result};
use crate::response::PortraitResult;

const ENTRY_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    version: u32,
    created_at: DateTime<Utc>,
    result: PortraitResult,
}

pub struct FileCache {
    cache_dir: PathBuf,
}

impl FileCache {
    /// Directories are created lazily on the first write
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the entry for `key`
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        let hex = key.to_hex();
        self.cache_dir.join(&hex[..2]).join(format!("{}.json", hex))
    }

    /// Remove every entry, leaving an empty cache directory
    pub async fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.cache_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::Cache(format!(
                    "failed to clear {}: {}",
                    self.cache_dir.display(),
                    e
                )))
            }
        }
        fs::create_dir_all(&self.cache_dir).await.map_err(|e| {
            AppError::Cache(format!(
                "failed to recreate {}: {}",
                self.cache_dir.display(),
                e
            ))
        })
    }

    async fn read_entry(&self, path: &Path) -> Result<Option<StoredEntry>> {
        let data = match fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::Cache(format!("failed to read entry: {}", e))),
        };
        let entry: StoredEntry = serde_json::from_slice(&data)
            .map_err(|e| AppError::Cache(format!("corrupt entry: {}", e)))?;
        if entry.version != ENTRY_VERSION {
            return Err(AppError::Cache(format!(
                "unsupported entry version {}",
                entry.version
            )));
        }
        Ok(Some(entry))
    }
}

#[async_trait]
impl ResultCache for FileCache {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &CacheKey) -> Option<PortraitResult> {
        let path = self.entry_path(key);
        match self.read_entry(&path).await {
            Ok(entry) => entry.map(|e| e.result),
            Err(e) => {
                warn!(cache_key = %key, path = ?path, error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    async fn put(&self, key: &CacheKey, result: &PortraitResult) -> Result<()> {
        let path = self.entry_path(key);
        if fs::try_exists(&path).await.unwrap_or(false) {
            debug!(cache_key = %key, "Cache entry already present");
            return Ok(());
        }

        let shard = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cache_dir.clone());
        fs::create_dir_all(&shard)
            .await
            .map_err(|e| AppError::Cache(format!("failed to create {}: {}", shard.display(), e)))?;

        let entry = StoredEntry {
            version: ENTRY_VERSION,
            created_at: Utc::now(),
            result: PortraitResult {
                cache_hit: false,
                ..result.clone()
            },
        };
        let data = serde_json::to_vec(&entry)
            .map_err(|e| AppError::Cache(format!("failed to serialize entry: {}", e)))?;

        let temp_path = shard.join(format!(".{}.{}.tmp", key, Uuid::new_v4()));
        if let Err(e) = fs::write(&temp_path, &data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(AppError::Cache(format!("failed to write entry: {}", e)));
        }
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(AppError::Cache(format!("failed to commit entry: {}", e)));
        }

        debug!(cache_key = %key, path = ?path, size = data.len(), "Stored cache entry");
        Ok(())
    }
}
