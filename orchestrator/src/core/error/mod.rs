use super::client::{
    cache::CacheError, catalog::CatalogError, lock::LockError, processor::ProcessorError, queue::QueueError,
    rate_limit::RateLimitError, store::StoreError,
};
use thiserror::Error;

pub type OrchestratorCoreResult<T> = Result<T, OrchestratorCoreError>;

#[derive(Error, Debug)]
pub enum OrchestratorCoreError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Queue error: {0}")]
    QueueError(#[from] QueueError),

    #[error("Lock Error: {0}")]
    LockError(#[from] LockError),

    #[error("Cache error: {0}")]
    CacheError(#[from] CacheError),

    #[error("Rate limit error: {0}")]
    RateLimitError(#[from] RateLimitError),

    #[error("Processor error: {0}")]
    ProcessorError(#[from] ProcessorError),

    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogError),
}
