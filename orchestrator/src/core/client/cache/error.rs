use thiserror::Error;

use crate::core::client::store::StoreError;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to encode cache value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid invalidation pattern {0}: '*' is only allowed as the last character")]
    InvalidPattern(String),
}
