pub mod error;
pub mod key;

use std::future::Future;
use std::sync::Arc;

pub use error::CacheError;
pub use key::CacheKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::client::store::KvStore;

/// JSON read cache with per-entry TTL.
///
/// Entries are only ever removed by expiry or by explicit invalidation. A trailing `*` in an
/// invalidation key removes every entry sharing the prefix before it.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KvStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T, ttl_seconds: u64) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw, Some(ttl_seconds)).await?;
        debug!(key = %key, ttl_seconds, "Cache entry written");
        Ok(())
    }

    /// Reads an entry. An entry that does not decode as `T` is treated as absent.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring undecodable cache entry");
                Ok(None)
            }
        }
    }

    /// Removes an entry, or every entry matching a `prefix*` pattern. Returns the number of
    /// removed entries. A bare `*` is rejected.
    pub async fn invalidate(&self, key: &str) -> Result<u64, CacheError> {
        match key.find('*') {
            None => Ok(u64::from(self.store.delete(key).await?)),
            Some(0) => Err(CacheError::InvalidPattern(key.to_string())),
            Some(position) if position == key.len() - 1 => {
                let prefix = &key[..position];
                let keys = self.store.scan_prefix(prefix).await?;
                let removed = self.store.delete_many(&keys).await?;
                debug!(pattern = %key, removed, "Cache entries invalidated by prefix");
                Ok(removed)
            }
            Some(_) => Err(CacheError::InvalidPattern(key.to_string())),
        }
    }

    pub async fn put<T: Serialize + Sync>(&self, key: &CacheKey, value: &T) -> Result<(), CacheError> {
        self.set(&key.key(), value, key.ttl_seconds()).await
    }

    pub async fn fetch<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>, CacheError> {
        self.get(&key.key()).await
    }

    /// Removes the entries behind a typed key. Only group keys take the prefix path, so an
    /// entity id is always matched literally.
    pub async fn evict(&self, key: &CacheKey) -> Result<u64, CacheError> {
        if key.is_pattern() {
            self.invalidate(&key.key()).await
        } else {
            Ok(u64::from(self.store.delete(&key.key()).await?))
        }
    }

    /// Read-through lookup.
    ///
    /// Returns the cached value when present; otherwise runs `compute` and caches a `Some` result
    /// under the key's TTL. Cache failures never fail the lookup: a failed read is a miss and a
    /// failed write is only logged. Errors from `compute` are returned as is.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &CacheKey, compute: F) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        match self.fetch::<T>(key).await {
            Ok(Some(value)) => {
                debug!(key = %key, "Cache hit");
                return Ok(Some(value));
            }
            Ok(None) => debug!(key = %key, "Cache miss"),
            Err(e) => warn!(key = %key, error = %e, "Cache read failed, computing value"),
        }

        let value = compute().await?;
        if let Some(value) = &value {
            if let Err(e) = self.put(key, value).await {
                warn!(key = %key, error = %e, "Failed to cache computed value");
            }
        }
        Ok(value)
    }
}
