use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::types::jobs::JobCategory;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QueueHealth {
    Healthy,
    Backlogged,
    Stalled,
    /// The queue could not be read
    Unknown,
}

impl QueueHealth {
    pub fn is_problem(&self) -> bool {
        matches!(self, QueueHealth::Backlogged | QueueHealth::Stalled)
    }
}

/// Point-in-time view of one category queue, computed on demand
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueMetricsSnapshot {
    pub name: JobCategory,
    pub size: u64,
    /// Jobs processed within the current metrics window
    pub processing_rate: u64,
    pub average_processing_time_ms: Option<f64>,
    pub oldest_job_age_seconds: Option<u64>,
    pub recent_error_count: u64,
    /// False when the store could not be read for this category
    pub available: bool,
}

impl QueueMetricsSnapshot {
    pub fn unavailable(name: JobCategory) -> Self {
        Self {
            name,
            size: 0,
            processing_rate: 0,
            average_processing_time_ms: None,
            oldest_job_age_seconds: None,
            recent_error_count: 0,
            available: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub store_connected: bool,
    pub last_check: DateTime<Utc>,
    pub queues: Vec<QueueMetricsSnapshot>,
    pub queue_health: BTreeMap<JobCategory, QueueHealth>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    pub total_jobs: u64,
    pub total_errors: u64,
    pub queues_with_jobs: usize,
    pub timestamp: DateTime<Utc>,
}

impl QueueSummary {
    pub fn from_snapshots(queues: &[QueueMetricsSnapshot], timestamp: DateTime<Utc>) -> Self {
        Self {
            total_jobs: queues.iter().map(|q| q.size).sum(),
            total_errors: queues.iter().map(|q| q.recent_error_count).sum(),
            queues_with_jobs: queues.iter().filter(|q| q.size > 0).count(),
            timestamp,
        }
    }
}

/// Aggregated statistics of one HTTP endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiStats {
    pub endpoint: String,
    pub requests: u64,
    pub average_response_time_ms: f64,
    pub error_rate: f64,
    pub p95_response_time_ms: u64,
}
