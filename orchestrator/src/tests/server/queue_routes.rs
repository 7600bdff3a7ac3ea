use axum::http::StatusCode;
use rstest::*;
use serde_json::{json, Value};

use super::{post_json, send};
use crate::core::client::processor::{MockJobProcessor, ProcessorError};
use crate::core::client::KvStore;
use crate::tests::config::TestConfigBuilder;
use crate::types::jobs::JobCategory;
use crate::types::params::ServiceParams;

fn transcription_request() -> Value {
    json!({
        "category": "transcription",
        "payload": {"fileId": "F1", "userId": "U1", "audioUrl": "https://storage.example.com/a.mp3"}
    })
}

#[rstest]
#[tokio::test]
async fn enqueue_stores_the_job_and_returns_its_id() {
    let services = TestConfigBuilder::new().build();

    let request = post_json("/api/queues/enqueue", &transcription_request());
    let (status, body) = send(services.config.clone(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let job = services.config.queue().oldest(JobCategory::Transcription).await.unwrap().unwrap();
    assert_eq!(body["data"]["jobId"], job.id.to_string());
    assert_eq!(job.payload["fileId"], "F1");
}

#[rstest]
#[case::missing_field(json!({"category": "translation", "payload": {"transcriptId": "T1", "userId": "U1"}}))]
#[case::unknown_category(json!({"category": "rendering", "payload": {}}))]
#[case::not_an_object(json!(["transcription"]))]
#[tokio::test]
async fn invalid_enqueue_requests_are_rejected_before_side_effects(#[case] request: Value) {
    let services = TestConfigBuilder::new().build();

    let (status, body) = send(services.config.clone(), post_json("/api/queues/enqueue", &request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert_eq!(services.config.queue().size(JobCategory::Translation).await.unwrap(), 0);
    assert!(services.store.get("ratelimit:enqueue:anonymous").await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
async fn enqueue_is_rate_limited_per_identity() {
    let params = ServiceParams { enqueue_rate_limit: 2, ..ServiceParams::default() };
    let services = TestConfigBuilder::new().configure_service_params(params).build();

    let request = |user: &str| {
        let mut request = post_json("/api/queues/enqueue", &transcription_request());
        request.headers_mut().insert("x-user-id", user.parse().unwrap());
        request
    };

    for _ in 0..2 {
        let (status, _) = send(services.config.clone(), request("U1")).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(services.config.clone(), request("U1")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);

    let (status, _) = send(services.config.clone(), request("U2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(services.config.queue().size(JobCategory::Transcription).await.unwrap(), 3);
}

#[rstest]
#[tokio::test]
async fn enqueue_reports_store_failure() {
    let services = TestConfigBuilder::new().build();
    services.store.set_available(false);

    let request = post_json("/api/queues/enqueue", &transcription_request());
    let (status, body) = send(services.config.clone(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[rstest]
#[tokio::test]
async fn process_on_empty_queue_reports_no_jobs() {
    let services = TestConfigBuilder::new().build();

    let request = post_json("/api/queues/process", &json!({"category": "translation"}));
    let (status, body) = send(services.config, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "No jobs in queue"}));
}

#[rstest]
#[tokio::test]
async fn process_runs_the_next_job() {
    let mut processor = MockJobProcessor::new();
    processor.expect_process().times(1).returning(|_| Ok(()));
    let services = TestConfigBuilder::new().configure_processor(processor).build();
    let job = services.config.queue().enqueue(JobCategory::Summarization, json!({"transcriptId": "T1"})).await.unwrap();

    // The legacy field names are accepted too
    let request = json!({"type": "summarization", "lockTimeout": 60});
    let (status, body) = send(services.config.clone(), post_json("/api/queues/process", &request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Summarization completed");
    assert_eq!(body["data"]["jobId"], job.id.to_string());
    assert_eq!(services.config.queue().size(JobCategory::Summarization).await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn process_reports_processing_failure_in_the_body() {
    let mut processor = MockJobProcessor::new();
    processor.expect_process().times(1).returning(|_| {
        Err(ProcessorError::Network { function: "translate-text".into(), message: "timed out".into() })
    });
    let services = TestConfigBuilder::new().configure_processor(processor).build();
    services.config.queue().enqueue(JobCategory::Translation, json!({"transcriptId": "T1"})).await.unwrap();

    let (status, body) =
        send(services.config, post_json("/api/queues/process", &json!({"category": "translation"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("timed out"));
}

#[rstest]
#[tokio::test]
async fn process_conflicts_while_the_lock_is_held() {
    let services = TestConfigBuilder::new().build();
    services.config.lock().acquire(&JobCategory::Transcription.lock_name(), 60).await.unwrap();
    services.config.queue().enqueue(JobCategory::Transcription, json!({"fileId": "F1"})).await.unwrap();

    let (status, body) =
        send(services.config.clone(), post_json("/api/queues/process", &json!({"category": "transcription"}))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"success": false, "error": "Another processor is already running"}));
    assert_eq!(services.config.queue().size(JobCategory::Transcription).await.unwrap(), 1);
}

#[rstest]
#[case::zero_lock_timeout(json!({"category": "transcription", "lockTimeoutSeconds": 0}))]
#[case::missing_category(json!({"lockTimeoutSeconds": 30}))]
#[tokio::test]
async fn invalid_process_requests_are_rejected(#[case] request: Value) {
    let services = TestConfigBuilder::new().build();

    let (status, _) = send(services.config, post_json("/api/queues/process", &request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[tokio::test]
async fn process_reports_store_failure() {
    let services = TestConfigBuilder::new().build();
    services.store.set_available(false);

    let (status, body) =
        send(services.config, post_json("/api/queues/process", &json!({"category": "transcription"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}
