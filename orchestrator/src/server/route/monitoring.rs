use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tracing::{debug, error, instrument};

use super::super::error::{ApiServiceError, ApiServiceResult};
use super::super::types::{ApiResponse, ApiStatsResponse, HealthSummary, QueuesResponse};
use crate::core::config::Config;
use crate::monitor::HealthMonitor;
use crate::types::constant::ADMIN_API_KEY_HEADER;
use crate::types::health::QueueSummary;
use crate::utils::secret_matches;

fn is_admin(config: &Config, headers: &HeaderMap) -> bool {
    let supplied = headers.get(ADMIN_API_KEY_HEADER).and_then(|value| value.to_str().ok()).unwrap_or_default();
    secret_matches(config.server_params().monitoring_api_key.as_deref(), supplied)
}

fn require_admin(config: &Config, headers: &HeaderMap) -> ApiServiceResult<()> {
    if is_admin(config, headers) {
        Ok(())
    } else {
        Err(ApiServiceError::Unauthorized("Unauthorized".to_string()))
    }
}

/// Per-category queue statistics plus a summary over all queues. Admin only.
#[instrument(skip_all)]
async fn handle_queue_stats_request(
    State(config): State<Arc<Config>>,
    headers: HeaderMap,
) -> ApiServiceResult<impl IntoResponse> {
    require_admin(&config, &headers)?;

    let queues = HealthMonitor::new(config).queue_stats().await;
    let summary = QueueSummary::from_snapshots(&queues, Utc::now());
    debug!(total_jobs = summary.total_jobs, total_errors = summary.total_errors, "Collected queue statistics");
    Ok(Json(ApiResponse::success_with_data(QueuesResponse { queues, summary }, None)))
}

/// Recorded statistics of every API endpoint. Admin only.
#[instrument(skip_all)]
async fn handle_api_stats_request(
    State(config): State<Arc<Config>>,
    headers: HeaderMap,
) -> ApiServiceResult<impl IntoResponse> {
    require_admin(&config, &headers)?;

    match config.api_stats().all().await {
        Ok(endpoints) => Ok(Json(ApiResponse::success_with_data(ApiStatsResponse { endpoints }, None))),
        Err(e) => {
            error!(error = %e, "Failed to read API statistics");
            Err(ApiServiceError::StoreUnavailable(e.to_string()))
        }
    }
}

/// Health status. Callers with the monitoring key get the full snapshot, everyone else only
/// the overall status and the time of the check.
#[instrument(skip_all)]
async fn handle_health_request(State(config): State<Arc<Config>>, headers: HeaderMap) -> Response {
    let admin = is_admin(&config, &headers);
    let snapshot = HealthMonitor::new(config).snapshot().await;

    if admin {
        Json(ApiResponse::success_with_data(snapshot, None)).into_response()
    } else {
        let summary = HealthSummary { status: snapshot.status, timestamp: snapshot.last_check };
        Json(ApiResponse::success_with_data(summary, None)).into_response()
    }
}

/// Creates a router for the monitoring endpoints.
pub fn monitoring_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/queues", get(handle_queue_stats_request))
        .route("/api-stats", get(handle_api_stats_request))
        .route("/health", get(handle_health_request))
        .with_state(config)
}
