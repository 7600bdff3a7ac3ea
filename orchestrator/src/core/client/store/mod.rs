pub mod error;
pub mod memory;
pub mod redis;

use std::collections::HashMap;

use async_trait::async_trait;
pub use error::StoreError;

/// Key-value store with Redis command semantics.
///
/// Every piece of coordination state (queues, locks, cache entries, counters) lives behind this
/// trait. Each method maps to one store command and is atomic on a single key; nothing here spans
/// several keys atomically. Implementations never retry on their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// SET, with `EX` when a TTL is given. Overwriting a key clears its previous TTL.
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> Result<(), StoreError>;

    /// SET NX EX. Returns true when the key was created by this call.
    async fn set_nx(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, StoreError>;

    /// Returns true when the key existed
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Returns the number of keys that existed
    async fn delete_many(&self, keys: &[String]) -> Result<u64, StoreError>;

    /// Deletes the key only if it currently holds `expected`, atomically.
    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, StoreError>;

    /// Pushes at the head of the list and returns the new length
    async fn lpush(&self, key: &str, value: &str) -> Result<u64, StoreError>;

    /// Pops from the tail of the list
    async fn rpop(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn llen(&self, key: &str) -> Result<u64, StoreError>;

    /// Element at `index`; negative indexes count from the tail (-1 is the last element)
    async fn lindex(&self, key: &str, index: i64) -> Result<Option<String>, StoreError>;

    /// Increments an integer value, creating it at 0 first. Does not touch the TTL.
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;

    /// Returns false when the key does not exist
    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool, StoreError>;

    /// Remaining TTL in seconds, `None` when the key is missing or has no expiry
    async fn ttl(&self, key: &str) -> Result<Option<u64>, StoreError>;

    async fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError>;

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;

    async fn hget_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;

    /// All keys starting with `prefix`. The prefix is matched literally.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
