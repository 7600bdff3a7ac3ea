use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::health::{ApiStats, HealthStatus, QueueMetricsSnapshot, QueueSummary};
use crate::types::jobs::JobCategory;

/// Represents a standardized API response structure.
///
/// Successful responses carry `data` and/or `message`, failed ones carry `error`.
///
/// # Examples
/// ```
/// use scribe_orchestrator::server::types::ApiResponse;
/// let response: ApiResponse<()> = ApiResponse::success(None);
/// assert!(response.success);
///
/// let response = ApiResponse::error("Invalid webhook secret".to_string());
/// assert!(!response.success);
/// assert_eq!(response.error.as_deref(), Some("Invalid webhook secret"));
/// ```
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T = ()> {
    /// Indicates if the operation was successful
    pub success: bool,
    /// Optional data payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Optional human readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error details of a failed operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse<()> {
    pub fn error(error: String) -> Self {
        Self { success: false, data: None, message: None, error: Some(error) }
    }
}

impl<T> ApiResponse<T> {
    /// Creates a successful response with data and an optional message.
    pub fn success_with_data(data: T, message: Option<String>) -> Self {
        Self { success: true, data: Some(data), message, error: None }
    }

    pub fn success(message: Option<String>) -> Self {
        Self { success: true, data: None, message, error: None }
    }
}

#[derive(Deserialize, Debug)]
pub struct EnqueueRequest {
    #[serde(alias = "type")]
    pub category: JobCategory,
    pub payload: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueResponse {
    pub job_id: Uuid,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    #[serde(alias = "type")]
    pub category: JobCategory,
    #[serde(default, alias = "lockTimeout")]
    pub lock_timeout_seconds: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub job_id: Uuid,
    pub requeued: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct QueuesResponse {
    pub queues: Vec<QueueMetricsSnapshot>,
    pub summary: QueueSummary,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiStatsResponse {
    pub endpoints: Vec<ApiStats>,
}

/// Health view for callers without the monitoring key
#[derive(Serialize, Deserialize, Debug)]
pub struct HealthSummary {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
}
