mod config;
mod errors;
mod file;
mod memory;
mod redis;
mod types;

pub use config::build_cache_store;
pub use errors::StorageError;
pub use file::FileCacheStore;
pub use memory::InMemoryCacheStore;
pub use redis::RedisCacheStore;
pub use types::{CacheData, CacheKey, CacheStore};
pub(crate) use types::expiry_after;
