pub mod error;

use std::sync::Arc;

pub use error::QueueError;
use tracing::{debug, warn};

use crate::core::client::store::KvStore;
use crate::types::jobs::{Job, JobCategory};

/// FIFO job queue per category, one store list per category.
///
/// Producers push at the head and consumers pop from the tail. A popped job is gone from the
/// store; there is no acknowledgement or visibility timeout.
#[derive(Clone)]
pub struct JobQueue {
    store: Arc<dyn KvStore>,
}

impl JobQueue {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Wraps the payload into a new job and appends it to the category queue.
    pub async fn enqueue(&self, category: JobCategory, payload: serde_json::Value) -> Result<Job, QueueError> {
        let job = Job::new(category, payload);
        self.push(&job).await?;
        debug!(category = %category, job_id = %job.id, "Job enqueued");
        Ok(job)
    }

    /// Puts a job back at the end of the line of its queue for another attempt.
    pub async fn requeue(&self, job: &Job) -> Result<Job, QueueError> {
        let retried = job.next_attempt();
        self.push(&retried).await?;
        debug!(category = %job.category, job_id = %job.id, attempt = retried.attempt, "Job re-queued");
        Ok(retried)
    }

    async fn push(&self, job: &Job) -> Result<u64, QueueError> {
        let raw = serde_json::to_string(job)?;
        Ok(self.store.lpush(&job.category.queue_key(), &raw).await?)
    }

    /// Pops the oldest job of the category.
    ///
    /// An entry that does not decode as a job is dropped from the queue and reported as
    /// [`QueueError::MalformedJob`].
    pub async fn dequeue(&self, category: JobCategory) -> Result<Option<Job>, QueueError> {
        let Some(raw) = self.store.rpop(&category.queue_key()).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<Job>(&raw) {
            Ok(job) => Ok(Some(job)),
            Err(e) => {
                warn!(category = %category, error = %e, "Dropped malformed queue entry");
                Err(QueueError::MalformedJob { category, message: e.to_string() })
            }
        }
    }

    pub async fn size(&self, category: JobCategory) -> Result<u64, QueueError> {
        Ok(self.store.llen(&category.queue_key()).await?)
    }

    /// The job that will be dequeued next, without removing it.
    pub async fn oldest(&self, category: JobCategory) -> Result<Option<Job>, QueueError> {
        let Some(raw) = self.store.lindex(&category.queue_key(), -1).await? else {
            return Ok(None);
        };
        let job = serde_json::from_str::<Job>(&raw)
            .map_err(|e| QueueError::MalformedJob { category, message: e.to_string() })?;
        Ok(Some(job))
    }
}
