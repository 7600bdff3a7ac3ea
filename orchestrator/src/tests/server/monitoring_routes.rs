use axum::http::StatusCode;
use rstest::*;
use serde_json::json;

use super::{get, send};
use crate::tests::config::{TestConfigBuilder, TEST_MONITORING_KEY};
use crate::types::jobs::JobCategory;

#[rstest]
#[case::missing_key(&[])]
#[case::wrong_key(&[("x-api-key", "guess")])]
#[tokio::test]
async fn queue_metrics_require_the_monitoring_key(#[case] headers: &[(&str, &str)]) {
    let services = TestConfigBuilder::new().build();

    let (status, body) = send(services.config, get("/api/monitoring/queues", headers)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "error": "Unauthorized"}));
}

#[rstest]
#[tokio::test]
async fn queue_metrics_report_every_category_with_a_summary() {
    let services = TestConfigBuilder::new().build();
    services.config.queue().enqueue(JobCategory::Translation, json!({"transcriptId": "T1"})).await.unwrap();
    services.config.queue().enqueue(JobCategory::Translation, json!({"transcriptId": "T2"})).await.unwrap();

    let (status, body) =
        send(services.config, get("/api/monitoring/queues", &[("x-api-key", TEST_MONITORING_KEY)])).await;

    assert_eq!(status, StatusCode::OK);
    let queues = body["data"]["queues"].as_array().unwrap();
    assert_eq!(queues.len(), 3);
    let translation = queues.iter().find(|q| q["name"] == "translation").unwrap();
    assert_eq!(translation["size"], 2);
    assert_eq!(body["data"]["summary"]["totalJobs"], 2);
    assert_eq!(body["data"]["summary"]["queuesWithJobs"], 1);
}

#[rstest]
#[tokio::test]
async fn health_is_limited_without_the_monitoring_key() {
    let services = TestConfigBuilder::new().build();

    let (status, body) = send(services.config, get("/api/monitoring/health", &[])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert!(body["data"]["timestamp"].is_string());
    assert!(body["data"].get("queues").is_none());
}

#[rstest]
#[tokio::test]
async fn health_is_complete_with_the_monitoring_key() {
    let services = TestConfigBuilder::new().build();

    let (status, body) =
        send(services.config, get("/api/monitoring/health", &[("x-api-key", TEST_MONITORING_KEY)])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["storeConnected"], true);
    assert_eq!(body["data"]["queues"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["data"]["queueHealth"]["transcription"], "healthy");
}

#[rstest]
#[tokio::test]
async fn health_reports_degraded_when_the_store_is_down() {
    let services = TestConfigBuilder::new().build();
    services.store.set_available(false);

    let (status, body) = send(services.config, get("/api/monitoring/health", &[])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "degraded");
}

#[rstest]
#[tokio::test]
async fn api_stats_are_collected_for_api_requests() {
    let services = TestConfigBuilder::new().build();
    let admin = [("x-api-key", TEST_MONITORING_KEY)];

    send(services.config.clone(), get("/api/monitoring/queues", &admin)).await;
    send(services.config.clone(), get("/api/monitoring/queues", &[])).await;
    send(services.config.clone(), get("/health", &[])).await;

    let (status, body) = send(services.config.clone(), get("/api/monitoring/api-stats", &admin)).await;
    assert_eq!(status, StatusCode::OK);

    let endpoints = body["data"]["endpoints"].as_array().unwrap();
    let queues = endpoints.iter().find(|e| e["endpoint"] == "monitoring/queues").unwrap();
    assert_eq!(queues["requests"], 2);
    assert_eq!(queues["errorRate"], 0.5);
    // Only /api routes are tracked
    assert!(endpoints.iter().all(|e| e["endpoint"] != "health"));
}

#[rstest]
#[tokio::test]
async fn api_stats_require_the_monitoring_key() {
    let services = TestConfigBuilder::new().build();

    let (status, _) = send(services.config, get("/api/monitoring/api-stats", &[])).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
