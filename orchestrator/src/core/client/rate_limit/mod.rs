use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::core::client::store::{KvStore, StoreError};
use crate::types::constant::RATE_LIMIT_KEY_PREFIX;

#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Unexpected counter value at {key}: {value}")]
    InvalidCounter { key: String, value: String },
}

/// Outcome of counting one request against a limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateDecision {
    pub count: i64,
    pub limit: u64,
    pub exceeded: bool,
}

/// Fixed-window request counter per identity and resource.
///
/// The window starts with the first request and the counter expires with it, so a client can
/// burst up to twice the limit around a window boundary. INCR and EXPIRE are separate commands;
/// a counter found without expiry is given one by the next request.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn key(identity: &str, resource: &str) -> String {
        format!("{}{}:{}", RATE_LIMIT_KEY_PREFIX, resource, identity)
    }

    /// Counts one request and returns the count within the current window.
    pub async fn increment(&self, identity: &str, resource: &str, ttl_seconds: u64) -> Result<i64, RateLimitError> {
        let key = Self::key(identity, resource);
        let count = self.store.incr(&key).await?;
        // The request that opens the window sets its length. A counter left without one, e.g.
        // after a failed EXPIRE, gets it on the next request instead of living forever.
        if count == 1 || self.store.ttl(&key).await?.is_none() {
            self.store.expire(&key, ttl_seconds).await?;
        }
        Ok(count)
    }

    /// Whether the identity is over the limit, without counting a request.
    pub async fn check(&self, identity: &str, resource: &str, limit: u64) -> Result<bool, RateLimitError> {
        let key = Self::key(identity, resource);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(false);
        };
        let count = raw.parse::<i64>().map_err(|_| RateLimitError::InvalidCounter { key, value: raw.clone() })?;
        Ok(exceeds(count, limit))
    }

    /// Counts one request and decides whether it is over the limit.
    pub async fn hit(
        &self,
        identity: &str,
        resource: &str,
        limit: u64,
        ttl_seconds: u64,
    ) -> Result<RateDecision, RateLimitError> {
        let count = self.increment(identity, resource, ttl_seconds).await?;
        let exceeded = exceeds(count, limit);
        if exceeded {
            debug!(identity = %identity, resource = %resource, count, limit, "Rate limit exceeded");
        }
        Ok(RateDecision { count, limit, exceeded })
    }
}

fn exceeds(count: i64, limit: u64) -> bool {
    count > 0 && count as u64 > limit
}
