use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::errors::StorageError;
use super::types::{CacheData, CacheKey, CacheStore, expiry_after};

const CACHE_PREFIX: &str = "cache";

pub struct InMemoryCacheStore {
    entry: Mutex<HashMap<String, (CacheData, DateTime<Utc>)>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory session store");
        Self {
            entry: Mutex::new(HashMap::new()),
        }
    }

    fn make_key(prefix: &str, key: &CacheKey) -> String {
        format!("{CACHE_PREFIX}:{prefix}:{}", key.as_str())
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn put_with_ttl(
        &self,
        prefix: &str,
        key: &CacheKey,
        value: CacheData,
        ttl: u64,
    ) -> Result<(), StorageError> {
        let expires_at = expiry_after(ttl)?;
        self.entry
            .lock()
            .await
            .insert(Self::make_key(prefix, key), (value, expires_at));
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &CacheKey) -> Result<Option<CacheData>, StorageError> {
        let key = Self::make_key(prefix, key);
        let mut entries = self.entry.lock().await;
        match entries.get(&key) {
            Some((_, expires_at)) if *expires_at <= Utc::now() => {
                tracing::debug!("Dropping expired entry {}", key);
                entries.remove(&key);
                Ok(None)
            }
            Some((data, _)) => Ok(Some(data.clone())),
            None => Ok(None),
        }
    }

    async fn remove(&self, prefix: &str, key: &CacheKey) -> Result<(), StorageError> {
        self.entry.lock().await.remove(&Self::make_key(prefix, key));
        Ok(())
    }
}
