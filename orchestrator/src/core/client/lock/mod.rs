pub mod error;

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
pub use error::LockError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::client::store::KvStore;
use crate::types::constant::LOCK_KEY_PREFIX;

/// Value proving ownership of an acquired lock. Only the holder of the token can release the
/// lock through [`DistributedLock::release`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockToken(String);

impl LockToken {
    fn generate() -> Self {
        Self(format!("{}-{}", Utc::now().timestamp_millis(), Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for LockToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of lock operations
#[derive(Debug, Clone, PartialEq)]
pub enum LockResult {
    Acquired(LockToken),
    /// Someone else holds the lock; the caller does not wait
    AlreadyHeld,
    Released,
    /// The lock exists but is held under another token
    NotOwner,
    /// The lock does not exist (never taken, released, or expired)
    NotFound,
}

/// Named mutual exclusion over the shared store.
///
/// A lock is a single key `lock:<name>` created with `SET NX EX`. The TTL is the only recovery
/// path for a holder that dies without releasing.
#[derive(Clone)]
pub struct DistributedLock {
    store: Arc<dyn KvStore>,
}

impl DistributedLock {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn key(name: &str) -> String {
        format!("{}{}", LOCK_KEY_PREFIX, name)
    }

    /// Takes the lock if nobody holds it. Never blocks.
    pub async fn acquire(&self, name: &str, ttl_seconds: u64) -> Result<LockResult, LockError> {
        if ttl_seconds == 0 {
            return Err(LockError::InvalidTtl { name: name.to_string() });
        }
        let token = LockToken::generate();
        if self.store.set_nx(&Self::key(name), token.as_str(), ttl_seconds).await? {
            debug!(lock = %name, ttl_seconds, "Lock acquired");
            Ok(LockResult::Acquired(token))
        } else {
            debug!(lock = %name, "Lock already held");
            Ok(LockResult::AlreadyHeld)
        }
    }

    /// Releases the lock if it is still held under `token`.
    pub async fn release(&self, name: &str, token: &LockToken) -> Result<LockResult, LockError> {
        let key = Self::key(name);
        if self.store.delete_if_equals(&key, token.as_str()).await? {
            debug!(lock = %name, "Lock released");
            return Ok(LockResult::Released);
        }
        // Not deleted: either gone already or taken over after expiry
        match self.store.get(&key).await? {
            Some(_) => {
                warn!(lock = %name, "Lock is held under another token, not released");
                Ok(LockResult::NotOwner)
            }
            None => {
                warn!(lock = %name, "Lock expired before release");
                Ok(LockResult::NotFound)
            }
        }
    }

    /// Deletes the lock regardless of its holder. Meant for operators clearing a stuck lock.
    pub async fn force_release(&self, name: &str) -> Result<bool, LockError> {
        let removed = self.store.delete(&Self::key(name)).await?;
        warn!(lock = %name, removed, "Lock force released");
        Ok(removed)
    }

    /// Token of the current holder, if any
    pub async fn holder(&self, name: &str) -> Result<Option<LockToken>, LockError> {
        Ok(self.store.get(&Self::key(name)).await?.map(LockToken::from))
    }

    pub async fn is_locked(&self, name: &str) -> Result<bool, LockError> {
        Ok(self.holder(name).await?.is_some())
    }

    /// Seconds until the lock expires on its own
    pub async fn ttl(&self, name: &str) -> Result<Option<u64>, LockError> {
        Ok(self.store.ttl(&Self::key(name)).await?)
    }
}
