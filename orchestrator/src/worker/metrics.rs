use opentelemetry::KeyValue;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::types::jobs::JobCategory;
use crate::types::webhook::EventType;
use crate::utils::metrics::ORCHESTRATOR_METRICS;

/// Metric names used in the structured log lines of the workers
pub struct WorkerMetrics {
    pub job_processed: &'static str,
    pub job_failed: &'static str,
    pub job_requeued: &'static str,
    pub lock_contention: &'static str,
    pub empty_queue: &'static str,
    pub invalidation_step: &'static str,
    pub webhook_event: &'static str,
}

pub static WORKER_METRICS: LazyLock<WorkerMetrics> = LazyLock::new(|| WorkerMetrics {
    job_processed: "dispatcher.jobs.processed",
    job_failed: "dispatcher.jobs.failed",
    job_requeued: "dispatcher.jobs.requeued",
    lock_contention: "dispatcher.lock.contention",
    empty_queue: "dispatcher.queue.empty",
    invalidation_step: "invalidation.steps",
    webhook_event: "invalidation.webhooks",
});

fn category_attributes(category: JobCategory) -> [KeyValue; 1] {
    [KeyValue::new("category", category.to_string())]
}

pub fn record_job_processed(category: JobCategory, elapsed_ms: u64) {
    let attributes = category_attributes(category);
    ORCHESTRATOR_METRICS.jobs_processed.add(1, &attributes);
    ORCHESTRATOR_METRICS.processing_time.record(elapsed_ms as f64, &attributes);
    info!(metric = WORKER_METRICS.job_processed, category = %category, elapsed_ms, "Job processed");
}

pub fn record_job_failed(category: JobCategory, elapsed_ms: u64) {
    let attributes = category_attributes(category);
    ORCHESTRATOR_METRICS.jobs_failed.add(1, &attributes);
    ORCHESTRATOR_METRICS.processing_time.record(elapsed_ms as f64, &attributes);
    info!(metric = WORKER_METRICS.job_failed, category = %category, elapsed_ms, "Job processing failed");
}

pub fn record_job_requeued(category: JobCategory, attempt: u32) {
    ORCHESTRATOR_METRICS.jobs_requeued.add(1, &category_attributes(category));
    info!(metric = WORKER_METRICS.job_requeued, category = %category, attempt, "Job re-queued for retry");
}

pub fn record_lock_contention(category: JobCategory) {
    ORCHESTRATOR_METRICS.lock_contention.add(1, &category_attributes(category));
    info!(metric = WORKER_METRICS.lock_contention, category = %category, "Another processor is already running");
}

pub fn record_empty_queue(category: JobCategory) {
    debug!(metric = WORKER_METRICS.empty_queue, category = %category, "No jobs in queue");
}

pub fn record_invalidation_step(event_type: EventType, outcome: &'static str) {
    ORCHESTRATOR_METRICS.cache_invalidations.add(
        1,
        &[KeyValue::new("event_type", event_type.to_string()), KeyValue::new("outcome", outcome)],
    );
    debug!(metric = WORKER_METRICS.invalidation_step, event_type = %event_type, outcome, "Invalidation step recorded");
}

pub fn record_webhook_event(event_type: &str, result: &'static str) {
    ORCHESTRATOR_METRICS
        .webhook_events
        .add(1, &[KeyValue::new("event_type", event_type.to_string()), KeyValue::new("result", result)]);
    info!(metric = WORKER_METRICS.webhook_event, event_type = %event_type, result, "Webhook event handled");
}
