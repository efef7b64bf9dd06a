use async_trait::async_trait;
use redis::{self, AsyncCommands};

use super::errors::StorageError;
use super::types::{CacheData, CacheKey, CacheStore};

const CACHE_PREFIX: &str = "cache";

pub struct RedisCacheStore {
    client: redis::Client,
}

impl RedisCacheStore {
    pub fn open(url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(url)?;
        Ok(Self { client })
    }

    fn make_key(prefix: &str, key: &CacheKey) -> String {
        format!("{CACHE_PREFIX}:{prefix}:{}", key.as_str())
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        // Verify the connection works
        let _conn = self.client.get_multiplexed_async_connection().await?;
        Ok(())
    }

    async fn put_with_ttl(
        &self,
        prefix: &str,
        key: &CacheKey,
        value: CacheData,
        ttl: u64,
    ) -> Result<(), StorageError> {
        // SET EX rejects a zero expiry
        if ttl == 0 {
            return Err(StorageError::Storage("TTL must be positive".to_string()));
        }
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::make_key(prefix, key);
        let value = serde_json::to_string(&value)?;
        let _: () = conn.set_ex(&key, value, ttl).await?;

        Ok(())
    }

    async fn get(&self, prefix: &str, key: &CacheKey) -> Result<Option<CacheData>, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::make_key(prefix, key);
        let value: Option<String> = conn.get(&key).await?;

        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, prefix: &str, key: &CacheKey) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::make_key(prefix, key);
        let _: () = conn.del(&key).await?;
        Ok(())
    }
}
