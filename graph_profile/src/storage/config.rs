use std::sync::Arc;

use crate::config::{SessionConfig, SessionType};

use super::errors::StorageError;
use super::types::CacheStore;
use super::{FileCacheStore, InMemoryCacheStore, RedisCacheStore};

/// Build and initialize the session store selected by the configuration
pub async fn build_cache_store(config: &SessionConfig) -> Result<Arc<dyn CacheStore>, StorageError> {
    let store: Arc<dyn CacheStore> = match config.store_type {
        SessionType::Filesystem => Arc::new(FileCacheStore::new(&config.file_dir)),
        SessionType::Memory => Arc::new(InMemoryCacheStore::new()),
        SessionType::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                StorageError::Storage("SESSION_REDIS_URL must be set for redis sessions".to_string())
            })?;
            Arc::new(RedisCacheStore::open(url)?)
        }
    };

    store.init().await.inspect_err(|e| {
        tracing::error!("Failed to initialize session store: {}", e);
    })?;

    tracing::info!("Session store ready: type={:?}", config.store_type);
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CacheData, CacheKey};
    use std::path::PathBuf;

    fn session_config(store_type: SessionType, file_dir: PathBuf) -> SessionConfig {
        SessionConfig {
            store_type,
            file_dir,
            redis_url: None,
            cookie_name: "session".to_string(),
            max_age: 60,
            cookie_secure: false,
        }
    }

    #[tokio::test]
    async fn test_build_memory_store() {
        let store = build_cache_store(&session_config(SessionType::Memory, PathBuf::new()))
            .await
            .unwrap();
        let key = CacheKey::new("k".to_string()).unwrap();
        store
            .put_with_ttl("session", &key, CacheData { value: "v".into() }, 60)
            .await
            .unwrap();
        assert!(store.get("session", &key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_build_filesystem_store_creates_dir() {
        let dir = std::env::temp_dir().join(format!(
            "graph-profile-build-{}",
            crate::utils::gen_random_string(8).unwrap()
        ));
        build_cache_store(&session_config(SessionType::Filesystem, dir.clone()))
            .await
            .unwrap();
        assert!(dir.is_dir());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_build_redis_store_requires_url() {
        let result = build_cache_store(&session_config(SessionType::Redis, PathBuf::new())).await;
        assert!(matches!(result, Err(StorageError::Storage(_))));
    }
}
