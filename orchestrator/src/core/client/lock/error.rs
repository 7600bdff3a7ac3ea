use thiserror::Error;

use crate::core::client::store::StoreError;

#[derive(Error, Debug)]
pub enum LockError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid lock TTL for {name}: TTL must be greater than zero")]
    InvalidTtl { name: String },
}
