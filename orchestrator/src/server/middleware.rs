use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use opentelemetry::KeyValue;
use tracing::warn;

use crate::core::config::Config;
use crate::utils::metrics::ORCHESTRATOR_METRICS;

/// Records response time and outcome of every `/api` request into the endpoint statistics.
///
/// Endpoints are named by their route without the `/api/` prefix, e.g. `monitoring/queues`.
/// A failure to record is logged and does not affect the response.
pub async fn track_api_stats(State(config): State<Arc<Config>>, req: Request, next: Next) -> Response {
    let endpoint = endpoint_name(req.extensions().get::<MatchedPath>().map(|path| path.as_str()));
    let started = Instant::now();

    let response = next.run(req).await;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    let is_error = response.status().is_client_error() || response.status().is_server_error();
    ORCHESTRATOR_METRICS.api_response_time.record(
        elapsed_ms as f64,
        &[KeyValue::new("endpoint", endpoint.clone()), KeyValue::new("status", response.status().as_u16() as i64)],
    );
    if let Err(e) = config.api_stats().record(&endpoint, elapsed_ms, is_error).await {
        warn!(endpoint = %endpoint, error = %e, "Failed to record API statistics");
    }
    response
}

fn endpoint_name(matched_path: Option<&str>) -> String {
    match matched_path {
        Some(path) => path.trim_start_matches("/api/").trim_start_matches('/').to_string(),
        None => "unmatched".to_string(),
    }
}
