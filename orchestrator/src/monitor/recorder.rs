use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::core::client::store::{KvStore, StoreError};
use crate::types::constant::{API_STATS_KEY_PREFIX, API_STATS_TTL_SECONDS};
use crate::types::health::ApiStats;
use crate::types::jobs::JobCategory;

const PROCESSED_FIELD: &str = "processed";
const ERRORS_FIELD: &str = "errors";
const TOTAL_MS_FIELD: &str = "total_ms";

const REQUESTS_FIELD: &str = "requests";
const TOTAL_TIME_FIELD: &str = "totalTime";
const API_ERRORS_FIELD: &str = "errors";
const P95_FIELD: &str = "p95";

/// Processing counters of one category within the current metrics window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingCounters {
    pub processed: u64,
    pub errors: u64,
    pub total_ms: u64,
}

impl ProcessingCounters {
    /// Mean processing time over every attempt in the window, successful or not
    pub fn average_ms(&self) -> Option<f64> {
        let attempts = self.processed + self.errors;
        (attempts > 0).then(|| self.total_ms as f64 / attempts as f64)
    }
}

fn field_u64(fields: &HashMap<String, String>, name: &str) -> u64 {
    fields.get(name).and_then(|raw| raw.parse::<i64>().ok()).map(|v| v.max(0) as u64).unwrap_or(0)
}

/// Writes and reads the per-category processing counters (hash `queue:<category>:metrics`).
#[derive(Clone)]
pub struct QueueMetricsRecorder {
    store: Arc<dyn KvStore>,
    window_seconds: u64,
}

impl QueueMetricsRecorder {
    pub fn new(store: Arc<dyn KvStore>, window_seconds: u64) -> Self {
        Self { store, window_seconds }
    }

    /// Counts one processing attempt. Each write pushes the window expiry forward.
    pub async fn record(&self, category: JobCategory, elapsed_ms: u64, success: bool) -> Result<(), StoreError> {
        let key = category.metrics_key();
        let field = if success { PROCESSED_FIELD } else { ERRORS_FIELD };
        self.store.hincr_by(&key, field, 1).await?;
        self.store.hincr_by(&key, TOTAL_MS_FIELD, elapsed_ms as i64).await?;
        self.store.expire(&key, self.window_seconds).await?;
        debug!(category = %category, elapsed_ms, success, "Processing attempt recorded");
        Ok(())
    }

    pub async fn read(&self, category: JobCategory) -> Result<ProcessingCounters, StoreError> {
        let fields = self.store.hget_all(&category.metrics_key()).await?;
        Ok(ProcessingCounters {
            processed: field_u64(&fields, PROCESSED_FIELD),
            errors: field_u64(&fields, ERRORS_FIELD),
            total_ms: field_u64(&fields, TOTAL_MS_FIELD),
        })
    }
}

/// Per-endpoint request statistics (hash `api:stats:<endpoint>`), kept for a week after the
/// last request.
///
/// The `p95` field holds the slowest response seen, which bounds the real 95th percentile
/// from above without keeping samples.
#[derive(Clone)]
pub struct ApiStatsRecorder {
    store: Arc<dyn KvStore>,
}

impl ApiStatsRecorder {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    fn key(endpoint: &str) -> String {
        format!("{}{}", API_STATS_KEY_PREFIX, endpoint)
    }

    pub async fn record(&self, endpoint: &str, response_time_ms: u64, is_error: bool) -> Result<(), StoreError> {
        let key = Self::key(endpoint);
        self.store.hincr_by(&key, REQUESTS_FIELD, 1).await?;
        self.store.hincr_by(&key, TOTAL_TIME_FIELD, response_time_ms as i64).await?;
        if is_error {
            self.store.hincr_by(&key, API_ERRORS_FIELD, 1).await?;
        }

        let current_max = self.store.hget(&key, P95_FIELD).await?.and_then(|raw| raw.parse::<u64>().ok()).unwrap_or(0);
        if response_time_ms > current_max {
            self.store.hset(&key, P95_FIELD, &response_time_ms.to_string()).await?;
        }

        self.store.expire(&key, API_STATS_TTL_SECONDS).await?;
        Ok(())
    }

    pub async fn get(&self, endpoint: &str) -> Result<Option<ApiStats>, StoreError> {
        let fields = self.store.hget_all(&Self::key(endpoint)).await?;
        Ok(Self::to_stats(endpoint, &fields))
    }

    /// Statistics of every endpoint that received traffic, sorted by endpoint
    pub async fn all(&self) -> Result<Vec<ApiStats>, StoreError> {
        let mut stats = Vec::new();
        for key in self.store.scan_prefix(API_STATS_KEY_PREFIX).await? {
            if let Some(entry) = self.get(&key[API_STATS_KEY_PREFIX.len()..]).await? {
                stats.push(entry);
            }
        }
        stats.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
        Ok(stats)
    }

    fn to_stats(endpoint: &str, fields: &HashMap<String, String>) -> Option<ApiStats> {
        let requests = field_u64(fields, REQUESTS_FIELD);
        if requests == 0 {
            return None;
        }
        Some(ApiStats {
            endpoint: endpoint.to_string(),
            requests,
            average_response_time_ms: field_u64(fields, TOTAL_TIME_FIELD) as f64 / requests as f64,
            error_rate: field_u64(fields, API_ERRORS_FIELD) as f64 / requests as f64,
            p95_response_time_ms: field_u64(fields, P95_FIELD),
        })
    }
}
