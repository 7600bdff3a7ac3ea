pub mod monitoring_routes;
pub mod queue_routes;
pub mod webhook_routes;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rstest::*;
use serde_json::Value;
use tower::ServiceExt;

use crate::core::config::Config;
use crate::server::route::server_router;
use crate::server::setup_server;
use crate::tests::config::TestConfigBuilder;

/// Sends one request through a fresh router and returns the status and the JSON body
/// (`Value::Null` for a non-JSON body).
pub async fn send(config: Arc<Config>, request: Request<Body>) -> (StatusCode, Value) {
    let response = server_router(config).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

#[rstest]
#[tokio::test]
async fn liveness_endpoint_answers_up() {
    let services = TestConfigBuilder::new().build();

    let (status, body) = send(services.config, get("/health", &[])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
}

#[rstest]
#[tokio::test]
async fn unknown_route_is_a_json_404() {
    let services = TestConfigBuilder::new().build();

    let (status, body) = send(services.config, get("/api/unknown", &[])).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[rstest]
#[tokio::test]
async fn server_binds_and_shuts_down_gracefully() {
    let services = TestConfigBuilder::new().build();

    let (address, handle) = setup_server(services.config).await.unwrap();
    assert_ne!(address.port(), 0);

    let response = reqwest::get(format!("http://{}/health", address)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    handle.shutdown().await.unwrap();
}
