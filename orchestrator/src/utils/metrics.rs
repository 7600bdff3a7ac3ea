use once_cell::sync::Lazy;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Process-wide instruments. They report to whatever meter provider the embedding binary
/// installs globally and are no-ops otherwise.
pub static ORCHESTRATOR_METRICS: Lazy<OrchestratorMetrics> = Lazy::new(OrchestratorMetrics::register);

pub struct OrchestratorMetrics {
    pub jobs_enqueued: Counter<u64>,
    pub jobs_processed: Counter<u64>,
    pub jobs_failed: Counter<u64>,
    pub jobs_requeued: Counter<u64>,
    pub lock_contention: Counter<u64>,
    pub rate_limited_requests: Counter<u64>,
    pub cache_invalidations: Counter<u64>,
    pub webhook_events: Counter<u64>,
    pub processing_time: Histogram<f64>,
    pub api_response_time: Histogram<f64>,
}

impl OrchestratorMetrics {
    pub fn register() -> Self {
        let meter: Meter = global::meter("crates.scribe_orchestrator.opentelemetry");

        let jobs_enqueued = meter
            .u64_counter("jobs_enqueued")
            .with_description("Count of jobs pushed to a queue")
            .with_unit("jobs")
            .build();

        let jobs_processed = meter
            .u64_counter("jobs_processed")
            .with_description("Count of jobs processed successfully")
            .with_unit("jobs")
            .build();

        let jobs_failed = meter
            .u64_counter("jobs_failed")
            .with_description("Count of jobs whose processing failed")
            .with_unit("jobs")
            .build();

        let jobs_requeued = meter
            .u64_counter("jobs_requeued")
            .with_description("Count of failed jobs put back on their queue")
            .with_unit("jobs")
            .build();

        let lock_contention = meter
            .u64_counter("lock_contention")
            .with_description("Count of process requests that found the category lock held")
            .with_unit("requests")
            .build();

        let rate_limited_requests = meter
            .u64_counter("rate_limited_requests")
            .with_description("Count of requests rejected by a rate limit")
            .with_unit("requests")
            .build();

        let cache_invalidations = meter
            .u64_counter("cache_invalidations")
            .with_description("Count of cache invalidation steps by outcome")
            .with_unit("steps")
            .build();

        let webhook_events = meter
            .u64_counter("webhook_events")
            .with_description("Count of completion webhooks by event type and result")
            .with_unit("events")
            .build();

        let processing_time = meter
            .f64_histogram("job_processing_time")
            .with_description("Time spent in the external processor per job")
            .with_unit("ms")
            .build();

        let api_response_time = meter
            .f64_histogram("api_response_time")
            .with_description("Response time of the monitored API endpoints")
            .with_unit("ms")
            .build();

        Self {
            jobs_enqueued,
            jobs_processed,
            jobs_failed,
            jobs_requeued,
            lock_contention,
            rate_limited_requests,
            cache_invalidations,
            webhook_events,
            processing_time,
            api_response_time,
        }
    }
}
