use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use opentelemetry::KeyValue;
use tracing::{error, info, instrument, warn};

use super::super::error::{ApiServiceError, ApiServiceResult};
use super::super::types::{ApiResponse, EnqueueRequest, EnqueueResponse, ProcessRequest, ProcessResponse};
use crate::core::config::Config;
use crate::types::constant::{ANONYMOUS_IDENTITY, ENQUEUE_RESOURCE, USER_ID_HEADER};
use crate::types::jobs::payload::validate_payload;
use crate::utils::metrics::ORCHESTRATOR_METRICS;
use crate::worker::{DispatchOutcome, ProcessingDispatcher};

/// Handles HTTP requests to add a job to a category queue.
///
/// The payload is validated against the category's shape before anything is written. The
/// caller identity for rate limiting comes from the `x-user-id` header and defaults to
/// `anonymous`.
///
/// # Errors
/// * `ApiServiceError::InvalidRequest` - Malformed body or payload
/// * `ApiServiceError::RateLimited` - The identity exceeded its enqueue rate
/// * `ApiServiceError::StoreUnavailable` - The job could not be stored
#[instrument(skip_all)]
async fn handle_enqueue_request(
    State(config): State<Arc<Config>>,
    headers: HeaderMap,
    body: Result<Json<EnqueueRequest>, JsonRejection>,
) -> ApiServiceResult<impl IntoResponse> {
    let Json(request) = body.map_err(|e| ApiServiceError::InvalidRequest(e.body_text()))?;
    validate_payload(request.category, &request.payload).map_err(ApiServiceError::InvalidRequest)?;

    let identity = caller_identity(&headers);
    let params = config.service_params();
    let decision = config
        .rate_limiter()
        .hit(&identity, ENQUEUE_RESOURCE, params.enqueue_rate_limit, params.enqueue_rate_window_seconds)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count enqueue request");
            ApiServiceError::StoreUnavailable(e.to_string())
        })?;
    if decision.exceeded {
        warn!(identity = %identity, count = decision.count, limit = decision.limit, "Enqueue rate limit exceeded");
        ORCHESTRATOR_METRICS.rate_limited_requests.add(1, &[KeyValue::new("resource", ENQUEUE_RESOURCE)]);
        return Err(ApiServiceError::RateLimited { count: decision.count, limit: decision.limit });
    }

    match config.queue().enqueue(request.category, request.payload).await {
        Ok(job) => {
            info!(job_id = %job.id, category = %job.category, "Job enqueued");
            ORCHESTRATOR_METRICS.jobs_enqueued.add(1, &[KeyValue::new("category", job.category.to_string())]);
            Ok(Json(ApiResponse::success_with_data(EnqueueResponse { job_id: job.id }, None)))
        }
        Err(e) => {
            error!(category = %request.category, error = %e, "Failed to enqueue job");
            Err(ApiServiceError::StoreUnavailable(e.to_string()))
        }
    }
}

/// Handles HTTP requests to process the next job of a category.
///
/// At most one job is processed per request. A processing failure is reported with
/// `success: false` and a 200 status; lock contention is a 409.
#[instrument(skip_all)]
async fn handle_process_request(
    State(config): State<Arc<Config>>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiServiceResult<impl IntoResponse> {
    let Json(request) = body.map_err(|e| ApiServiceError::InvalidRequest(e.body_text()))?;
    if request.lock_timeout_seconds == Some(0) {
        return Err(ApiServiceError::InvalidRequest("lockTimeoutSeconds must be positive".to_string()));
    }

    let outcome = ProcessingDispatcher::process_next(request.category, request.lock_timeout_seconds, config)
        .await
        .map_err(|e| {
            error!(category = %request.category, error = %e, "Dispatcher run failed");
            ApiServiceError::from(e)
        })?;

    let message = outcome.message();
    let response = match outcome {
        DispatchOutcome::AlreadyRunning => return Err(ApiServiceError::AlreadyRunning),
        DispatchOutcome::NoWork => ApiResponse::success(Some(message)),
        DispatchOutcome::Processed { job_id, success: true, requeued, .. } => {
            ApiResponse::success_with_data(ProcessResponse { job_id, requeued }, Some(message))
        }
        DispatchOutcome::Processed { job_id, success: false, requeued, .. } => ApiResponse {
            success: false,
            data: Some(ProcessResponse { job_id, requeued }),
            message: Some(message),
            error: None,
        },
    };
    Ok(Json(response))
}

fn caller_identity(headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(ANONYMOUS_IDENTITY)
        .to_string()
}

/// Creates a router for the queue endpoints.
pub fn queue_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/enqueue", post(handle_enqueue_request))
        .route("/process", post(handle_process_request))
        .with_state(config)
}
