use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::types::constant::ORCHESTRATOR_VERSION;

/// Liveness only. Store and queue health live under `/api/monitoring/health`.
pub(super) fn local_route() -> Router {
    Router::new().route("/health", get(liveness_handler))
}

async fn liveness_handler() -> Json<Value> {
    Json(json!({ "status": "UP", "version": ORCHESTRATOR_VERSION }))
}
