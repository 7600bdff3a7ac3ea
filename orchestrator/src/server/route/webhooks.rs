use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tracing::{info, instrument};

use super::super::error::{ApiServiceError, ApiServiceResult};
use super::super::types::ApiResponse;
use crate::core::config::Config;
use crate::types::webhook::{WebhookEvent, WebhookPayload};
use crate::worker::{InvalidationRouter, WebhookError};

/// Metric label for bodies without a readable `type`
const UNKNOWN_EVENT_TYPE: &str = "unknown";

/// Handles completion notifications of the external processors.
///
/// The secret is checked before the body is interpreted, so a caller without the secret learns
/// nothing about the expected payload. Invalidation problems past that point are logged and
/// still answered with success.
#[instrument(skip_all)]
async fn handle_edge_function_complete(
    State(config): State<Arc<Config>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiServiceResult<impl IntoResponse> {
    let Json(body) = body.map_err(|e| ApiServiceError::InvalidRequest(e.body_text()))?;

    let event_type = body.get("type").and_then(Value::as_str).unwrap_or(UNKNOWN_EVENT_TYPE);
    let secret = body.get("secret").and_then(Value::as_str).unwrap_or_default();
    InvalidationRouter::authorize(event_type, secret, &config)?;

    let payload: WebhookPayload = serde_json::from_value(body)
        .map_err(|e| ApiServiceError::from(WebhookError::Validation(e.to_string())))?;
    let event = WebhookEvent::from(payload);

    let report = InvalidationRouter::route(&event, config).await?;
    info!(
        event_type = %report.event_type,
        entity_id = %report.entity_id,
        invalidated = ?report.invalidated(),
        "Webhook processed"
    );
    Ok(Json(ApiResponse::<()>::success(None)))
}

/// Creates a router for the webhook endpoints.
pub fn webhook_router(config: Arc<Config>) -> Router {
    Router::new().route("/edge-function-complete", post(handle_edge_function_complete)).with_state(config)
}
