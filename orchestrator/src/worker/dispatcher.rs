use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::core::client::lock::{LockError, LockResult};
use crate::core::client::queue::QueueError;
use crate::core::config::Config;
use crate::types::jobs::{Job, JobCategory};
use crate::worker::metrics;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Lock error: {0}")]
    Lock(#[from] LockError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Processing of a {category} job panicked: {message}")]
    Panicked { category: JobCategory, message: String },
}

/// What a single dispatcher run did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum DispatchOutcome {
    /// The queue was empty
    NoWork,
    /// Another processor holds the category lock
    AlreadyRunning,
    /// One job was taken off the queue and handed to the processor
    #[serde(rename_all = "camelCase")]
    Processed { job_id: Uuid, success: bool, message: String, requeued: bool },
}

impl DispatchOutcome {
    pub fn message(&self) -> String {
        match self {
            DispatchOutcome::NoWork => "No jobs in queue".to_string(),
            DispatchOutcome::AlreadyRunning => "Another processor is already running".to_string(),
            DispatchOutcome::Processed { message, .. } => message.clone(),
        }
    }
}

/// Runs at most one job of a category under the category's processing lock.
pub struct ProcessingDispatcher;

impl ProcessingDispatcher {
    /// Takes the category lock, processes the oldest job if there is one, and releases the lock.
    ///
    /// Contention is reported as [`DispatchOutcome::AlreadyRunning`] without waiting. The lock is
    /// released on every path once acquired, including a panic inside the processor. A release
    /// that fails is logged and left to the lock TTL.
    #[instrument(skip_all, fields(category = %category, lock_ttl_seconds = ?lock_ttl_seconds))]
    pub async fn process_next(
        category: JobCategory,
        lock_ttl_seconds: Option<u64>,
        config: Arc<Config>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let ttl = lock_ttl_seconds.unwrap_or(config.service_params().default_lock_ttl_seconds);
        let lock_name = category.lock_name();

        let token = match config.lock().acquire(&lock_name, ttl).await? {
            LockResult::Acquired(token) => token,
            _ => {
                metrics::record_lock_contention(category);
                return Ok(DispatchOutcome::AlreadyRunning);
            }
        };

        let result = AssertUnwindSafe(Self::run_locked(category, &config)).catch_unwind().await;

        match config.lock().release(&lock_name, &token).await {
            Ok(LockResult::Released) => {}
            Ok(other) => warn!(lock = %lock_name, result = ?other, "Processing lock was not released by its holder"),
            Err(e) => error!(lock = %lock_name, error = %e, "Failed to release processing lock, it will expire"),
        }

        match result {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = extract_panic_message(&panic);
                error!(category = %category, panic = %message, "Job processing panicked");
                Err(DispatchError::Panicked { category, message })
            }
        }
    }

    async fn run_locked(category: JobCategory, config: &Config) -> Result<DispatchOutcome, DispatchError> {
        let Some(job) = config.queue().dequeue(category).await? else {
            metrics::record_empty_queue(category);
            return Ok(DispatchOutcome::NoWork);
        };

        info!(job_id = %job.id, attempt = job.attempt, "Processing job");
        let started = Instant::now();
        let result = config.processor().process(&job).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if let Err(e) = config.queue_metrics().record(category, elapsed_ms, result.is_ok()).await {
            warn!(category = %category, error = %e, "Failed to record processing metrics");
        }

        match result {
            Ok(()) => {
                metrics::record_job_processed(category, elapsed_ms);
                Ok(DispatchOutcome::Processed {
                    job_id: job.id,
                    success: true,
                    message: category.completed_message().to_string(),
                    requeued: false,
                })
            }
            Err(e) => {
                metrics::record_job_failed(category, elapsed_ms);
                error!(job_id = %job.id, error = %e, "Job processing failed");
                let requeued = Self::retry(&job, config).await;
                Ok(DispatchOutcome::Processed { job_id: job.id, success: false, message: e.to_string(), requeued })
            }
        }
    }

    /// Re-queues a failed job while it has attempts left. Returns whether it was re-queued.
    async fn retry(job: &Job, config: &Config) -> bool {
        if job.attempt >= config.service_params().max_job_retries {
            return false;
        }
        match config.queue().requeue(job).await {
            Ok(retried) => {
                metrics::record_job_requeued(job.category, retried.attempt);
                true
            }
            Err(e) => {
                error!(job_id = %job.id, error = %e, "Failed to re-queue job, it is lost");
                false
            }
        }
    }
}

fn extract_panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    panic
        .downcast_ref::<String>()
        .map(|s| s.as_str())
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("Unknown panic")
        .to_string()
}
