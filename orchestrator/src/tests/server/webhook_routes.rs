use axum::http::StatusCode;
use mockall::predicate::eq;
use rstest::*;
use serde_json::{json, Value};

use super::{post_json, send};
use crate::core::client::catalog::MockEntityCatalog;
use crate::core::client::{CacheKey, KvStore};
use crate::tests::config::{TestConfigBuilder, TEST_WEBHOOK_SECRET};

const WEBHOOK_URI: &str = "/api/webhooks/edge-function-complete";

fn completion(secret: &str) -> Value {
    json!({
        "type": "transcription.complete",
        "data": {"id": "T1", "status": "completed"},
        "secret": secret
    })
}

/// Body carrying the valid secret, with `data` left out when `None`
fn signed(event_type: &str, data: Option<Value>) -> Value {
    let mut body = json!({"type": event_type, "secret": TEST_WEBHOOK_SECRET});
    if let Some(data) = data {
        body["data"] = data;
    }
    body
}

#[rstest]
#[tokio::test]
async fn completion_invalidates_the_cached_entities() {
    let mut catalog = MockEntityCatalog::new();
    catalog.expect_transcript_file().with(eq("T1")).times(1).returning(|_| Ok(Some("F1".to_string())));
    catalog.expect_file_owner().with(eq("F1")).times(1).returning(|_| Ok(Some("U1".to_string())));
    let services = TestConfigBuilder::new().configure_catalog(catalog).build();
    services.config.cache().put(&CacheKey::Transcript("T1".into()), &"cached").await.unwrap();
    services.config.cache().put(&CacheKey::UserFiles { owner: "U1".into(), limit: 10 }, &"cached").await.unwrap();

    let (status, body) = send(services.config, post_json(WEBHOOK_URI, &completion(TEST_WEBHOOK_SECRET))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
    assert!(services.store.get("transcript:T1").await.unwrap().is_none());
    assert!(services.store.get("user-files:U1:10").await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
async fn wrong_secret_is_unauthorized_even_for_malformed_bodies() {
    let services = TestConfigBuilder::new().build();

    let (status, body) = send(services.config.clone(), post_json(WEBHOOK_URI, &completion("guess"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"success": false, "error": "Invalid webhook secret"}));

    let (status, _) = send(services.config, post_json(WEBHOOK_URI, &json!({"type": "unknown"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case::unknown_type(signed("render.complete", Some(json!({"id": "T1", "status": "completed"}))))]
#[case::missing_data(signed("transcription.complete", None))]
#[case::empty_id(signed("summarization.complete", Some(json!({"id": "", "status": "completed"}))))]
#[tokio::test]
async fn malformed_payload_with_valid_secret_is_a_bad_request(#[case] body: Value) {
    let services = TestConfigBuilder::new().build();

    let (status, response) = send(services.config, post_json(WEBHOOK_URI, &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().starts_with("Invalid payload format"));
}
