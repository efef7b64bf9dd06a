use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::utils::gen_random_string;

use super::errors::StorageError;
use super::types::{CacheData, CacheKey, CacheStore, expiry_after};

/// Writes between two sweeps of expired files
const SWEEP_INTERVAL: u64 = 500;

/// Session store keeping one JSON file per entry under `{root}/{prefix}/{key}.json`.
///
/// Expired files are swept at `init` and every [`SWEEP_INTERVAL`] writes, so
/// entries that are never read again do not accumulate.
pub struct FileCacheStore {
    root: PathBuf,
    writes: AtomicU64,
}

#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    expires_at: DateTime<Utc>,
    data: CacheData,
}

impl FileCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        tracing::info!("Creating filesystem session store at {}", root.display());
        Self {
            root,
            writes: AtomicU64::new(0),
        }
    }

    fn make_path(&self, prefix: &str, key: &CacheKey) -> PathBuf {
        self.root.join(prefix).join(format!("{}.json", key.as_str()))
    }

    async fn remove_file(path: &Path) -> Result<(), StorageError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every expired or unreadable entry file; returns how many went
    pub async fn sweep_expired(&self) -> Result<usize, StorageError> {
        let mut removed = 0;
        let mut prefixes = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let now = Utc::now();
        while let Some(prefix) = prefixes.next_entry().await? {
            if !prefix.file_type().await?.is_dir() {
                continue;
            }
            let mut files = tokio::fs::read_dir(prefix.path()).await?;
            while let Some(file) = files.next_entry().await? {
                let path = file.path();
                if path.extension().is_none_or(|ext| ext != "json") {
                    continue;
                }
                let contents = match tokio::fs::read(&path).await {
                    Ok(contents) => contents,
                    Err(e) if e.kind() == ErrorKind::NotFound => continue,
                    Err(e) => return Err(e.into()),
                };
                let live = serde_json::from_slice::<FileEntry>(&contents)
                    .is_ok_and(|entry| entry.expires_at > now);
                if !live {
                    Self::remove_file(&path).await?;
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            tracing::debug!("Swept {} stale session files", removed);
        }
        Ok(removed)
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        self.sweep_expired().await?;
        Ok(())
    }

    async fn put_with_ttl(
        &self,
        prefix: &str,
        key: &CacheKey,
        value: CacheData,
        ttl: u64,
    ) -> Result<(), StorageError> {
        let path = self.make_path(prefix, key);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let entry = FileEntry {
            expires_at: expiry_after(ttl)?,
            data: value,
        };
        let contents = serde_json::to_vec(&entry)?;

        // Write then rename so readers never observe a partial file
        let suffix = gen_random_string(6).map_err(|e| StorageError::Storage(e.to_string()))?;
        let tmp = path.with_extension(format!("json.{suffix}.tmp"));
        tokio::fs::write(&tmp, contents).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        if self.writes.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            if let Err(e) = self.sweep_expired().await {
                tracing::warn!("Failed to sweep session files: {}", e);
            }
        }
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &CacheKey) -> Result<Option<CacheData>, StorageError> {
        let path = self.make_path(prefix, key);
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: FileEntry = match serde_json::from_slice(&contents) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Discarding unreadable session file {}: {}", path.display(), e);
                Self::remove_file(&path).await?;
                return Ok(None);
            }
        };

        if entry.expires_at <= Utc::now() {
            tracing::debug!("Session file {} expired at {}", path.display(), entry.expires_at);
            Self::remove_file(&path).await?;
            return Ok(None);
        }

        Ok(Some(entry.data))
    }

    async fn remove(&self, prefix: &str, key: &CacheKey) -> Result<(), StorageError> {
        Self::remove_file(&self.make_path(prefix, key)).await
    }
}
