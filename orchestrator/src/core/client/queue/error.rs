use thiserror::Error;

use crate::core::client::store::StoreError;
use crate::types::jobs::JobCategory;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to serialize job: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed job in {category} queue: {message}")]
    MalformedJob { category: JobCategory, message: String },
}
