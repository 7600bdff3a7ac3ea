pub mod error;
pub mod http;

use async_trait::async_trait;
pub use error::ProcessorError;
pub use http::HttpProcessor;

use crate::types::jobs::Job;

/// Runs the actual work of a job, e.g. by invoking an external function.
///
/// Implementations must not touch the queue or the processing lock; the dispatcher owns both.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobProcessor: Send + Sync {
    async fn process(&self, job: &Job) -> Result<(), ProcessorError>;
}
