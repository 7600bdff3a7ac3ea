use std::sync::Arc;

use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::{Json, Router};
use monitoring::monitoring_router;
use public::local_route;
use queues::queue_router;
use webhooks::webhook_router;

use super::middleware::track_api_stats;
use super::types::ApiResponse;
use crate::core::config::Config;

pub(super) mod monitoring;
pub(super) mod public;
pub(super) mod queues;
pub(super) mod webhooks;

/// Handles 404 Not Found responses for the application.
///
/// This handler is used as a fallback when no other routes match the request.
pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ApiResponse::error("The requested resource was not found".to_string())))
}

fn api_route(config: Arc<Config>) -> Router {
    Router::new()
        .nest("/queues", queue_router(config.clone()))
        .nest("/monitoring", monitoring_router(config.clone()))
        .nest("/webhooks", webhook_router(config.clone()))
        .route_layer(from_fn_with_state(config, track_api_stats))
}

pub fn server_router(config: Arc<Config>) -> Router {
    Router::new().merge(local_route()).nest("/api", api_route(config)).fallback(handler_404)
}
