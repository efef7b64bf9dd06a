use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::errors::StorageError;

/// Data stored in the cache
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheData {
    pub value: String,
}

const MAX_KEY_LEN: usize = 128;

/// Validated cache key.
///
/// Keys come from browser cookies and end up as file names or redis keys, so
/// only the base64url alphabet is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: String) -> Result<Self, StorageError> {
        if key.is_empty() || key.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey(key));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(StorageError::InvalidKey(key));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Absolute expiry for an entry stored now with `ttl` seconds to live
pub(crate) fn expiry_after(ttl: u64) -> Result<DateTime<Utc>, StorageError> {
    i64::try_from(ttl)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| StorageError::Storage(format!("TTL out of range: {ttl}")))
}

#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put a value into the store, expiring after `ttl` seconds.
    async fn put_with_ttl(
        &self,
        prefix: &str,
        key: &CacheKey,
        value: CacheData,
        ttl: u64,
    ) -> Result<(), StorageError>;

    /// Get a value from the store. Expired values are reported as absent.
    async fn get(&self, prefix: &str, key: &CacheKey) -> Result<Option<CacheData>, StorageError>;

    /// Remove a value from the store.
    async fn remove(&self, prefix: &str, key: &CacheKey) -> Result<(), StorageError>;
}
