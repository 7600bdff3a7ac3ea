pub mod recorder;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use strum::IntoEnumIterator;
use tracing::{instrument, warn};

use crate::core::client::queue::QueueError;
use crate::core::config::Config;
use crate::types::health::{HealthSnapshot, HealthStatus, QueueHealth, QueueMetricsSnapshot};
use crate::types::jobs::JobCategory;
use crate::types::params::ServiceParams;

/// On-demand health and queue metrics. Nothing runs in the background; every call reads the
/// store afresh.
pub struct HealthMonitor {
    config: Arc<Config>,
}

impl HealthMonitor {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// One snapshot per category. A category that cannot be read is reported as unavailable
    /// instead of failing the whole call.
    pub async fn queue_stats(&self) -> Vec<QueueMetricsSnapshot> {
        self.queue_stats_at(Utc::now()).await
    }

    pub async fn queue_stats_at(&self, now: DateTime<Utc>) -> Vec<QueueMetricsSnapshot> {
        let mut snapshots = Vec::new();
        for category in JobCategory::iter() {
            match self.queue_snapshot(category, now).await {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => {
                    warn!(category = %category, error = %e, "Failed to read queue metrics");
                    snapshots.push(QueueMetricsSnapshot::unavailable(category));
                }
            }
        }
        snapshots
    }

    async fn queue_snapshot(
        &self,
        category: JobCategory,
        now: DateTime<Utc>,
    ) -> Result<QueueMetricsSnapshot, QueueError> {
        let queue = self.config.queue();
        let size = queue.size(category).await?;
        let oldest_job_age_seconds = queue.oldest(category).await?.map(|job| job.age_seconds(now));
        let counters = self.config.queue_metrics().read(category).await?;

        Ok(QueueMetricsSnapshot {
            name: category,
            size,
            processing_rate: counters.processed,
            average_processing_time_ms: counters.average_ms(),
            oldest_job_age_seconds,
            recent_error_count: counters.errors,
            available: true,
        })
    }

    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> HealthSnapshot {
        self.snapshot_at(Utc::now()).await
    }

    pub async fn snapshot_at(&self, now: DateTime<Utc>) -> HealthSnapshot {
        let store_connected = match self.config.store().ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Store health check failed");
                false
            }
        };

        let queues = self.queue_stats_at(now).await;
        let params = self.config.service_params();
        let queue_health: BTreeMap<JobCategory, QueueHealth> =
            queues.iter().map(|snapshot| (snapshot.name, classify_queue(snapshot, params))).collect();
        let problems = queue_health.values().filter(|health| health.is_problem()).count();

        HealthSnapshot {
            status: overall_status(store_connected, problems),
            store_connected,
            last_check: now,
            queues,
            queue_health,
        }
    }
}

/// Backlog takes precedence over stall when both apply.
pub fn classify_queue(snapshot: &QueueMetricsSnapshot, params: &ServiceParams) -> QueueHealth {
    if !snapshot.available {
        return QueueHealth::Unknown;
    }
    if snapshot.size > params.backlog_threshold {
        return QueueHealth::Backlogged;
    }
    match snapshot.oldest_job_age_seconds {
        Some(age) if age > params.stall_threshold_seconds => QueueHealth::Stalled,
        _ => QueueHealth::Healthy,
    }
}

pub fn overall_status(store_connected: bool, problem_queues: usize) -> HealthStatus {
    match (store_connected, problem_queues) {
        (true, 0) => HealthStatus::Healthy,
        (true, 1) => HealthStatus::Degraded,
        (true, _) => HealthStatus::Unhealthy,
        (false, 0) => HealthStatus::Degraded,
        (false, _) => HealthStatus::Unhealthy,
    }
}
