use assert_matches::assert_matches;
use mockall::predicate::eq;
use rstest::*;

use crate::core::client::catalog::{CatalogError, DocumentParents, MockEntityCatalog};
use crate::core::client::{CacheKey, KvStore};
use crate::tests::config::{TestConfig, TestConfigBuilder, TEST_WEBHOOK_SECRET};
use crate::types::params::ServerParams;
use crate::types::webhook::{EventStatus, EventType, WebhookEvent};
use crate::worker::{InvalidationReport, InvalidationRouter, StepOutcome, WebhookError};

fn event(event_type: EventType, entity_id: &str) -> WebhookEvent {
    WebhookEvent {
        event_type,
        entity_id: entity_id.to_string(),
        status: EventStatus::Completed,
        error: None,
        secret: TEST_WEBHOOK_SECRET.to_string(),
    }
}

/// Seeds one entry per derived key plus entries of an unrelated owner
async fn seed_cache(services: &TestConfig) {
    let cache = services.config.cache();
    for key in [
        CacheKey::Transcript("T1".into()),
        CacheKey::File("F1".into()),
        CacheKey::Translation("X1".into()),
        CacheKey::Summary("S1".into()),
        CacheKey::UserFiles { owner: "U1".into(), limit: 10 },
        CacheKey::UserFiles { owner: "U1".into(), limit: 20 },
        CacheKey::UserFiles { owner: "U2".into(), limit: 10 },
    ] {
        cache.put(&key, &"cached").await.unwrap();
    }
}

async fn route(services: &TestConfig, event: &WebhookEvent) -> Result<InvalidationReport, WebhookError> {
    InvalidationRouter::route(event, services.config.clone()).await
}

async fn cached(services: &TestConfig, key: &str) -> bool {
    services.store.get(key).await.unwrap().is_some()
}

#[rstest]
#[tokio::test]
async fn transcription_cascades_to_file_and_owner_listing() {
    let mut catalog = MockEntityCatalog::new();
    catalog.expect_transcript_file().with(eq("T1")).times(1).returning(|_| Ok(Some("F1".to_string())));
    catalog.expect_file_owner().with(eq("F1")).times(1).returning(|_| Ok(Some("U1".to_string())));
    let services = TestConfigBuilder::new().configure_catalog(catalog).build();
    seed_cache(&services).await;

    let report = route(&services, &event(EventType::TranscriptionComplete, "T1")).await.unwrap();

    assert_eq!(report.invalidated(), vec!["transcript:T1", "file:F1", "user-files:U1:*"]);
    assert_eq!(report.steps[2].outcome, StepOutcome::Invalidated { removed: 2 });
    assert!(report.is_complete());
    assert!(!cached(&services, "transcript:T1").await);
    assert!(!cached(&services, "file:F1").await);
    assert!(!cached(&services, "user-files:U1:10").await);
    assert!(cached(&services, "user-files:U2:10").await);
    assert!(cached(&services, "translation:X1").await);
}

#[rstest]
#[tokio::test]
async fn missing_transcript_row_truncates_the_cascade() {
    let mut catalog = MockEntityCatalog::new();
    catalog.expect_transcript_file().times(1).returning(|_| Ok(None));
    // file_owner has no expectation: calling it would fail the test
    let services = TestConfigBuilder::new().configure_catalog(catalog).build();
    seed_cache(&services).await;

    let report = route(&services, &event(EventType::TranscriptionComplete, "T1")).await.unwrap();

    assert_eq!(report.invalidated(), vec!["transcript:T1"]);
    assert_eq!(report.steps.len(), 2);
    assert_eq!(report.steps[1].outcome, StepOutcome::NotFound);
    assert!(!report.is_complete());
    assert!(cached(&services, "file:F1").await);
    assert!(cached(&services, "user-files:U1:10").await);
}

#[rstest]
#[case::translation(EventType::TranslationComplete, "X1", "translation:X1")]
#[case::summarization(EventType::SummarizationComplete, "S1", "summary:S1")]
#[tokio::test]
async fn derived_documents_invalidate_parent_transcript_and_owner_listing(
    #[case] event_type: EventType,
    #[case] entity_id: &str,
    #[case] own_key: &str,
) {
    let parents = || -> Result<Option<DocumentParents>, CatalogError> {
        Ok(Some(DocumentParents { transcript_id: Some("T1".into()), owner_id: Some("U1".into()) }))
    };
    let mut catalog = MockEntityCatalog::new();
    match event_type {
        EventType::TranslationComplete => {
            catalog.expect_translation_parents().with(eq("X1")).times(1).returning(move |_| parents());
        }
        _ => {
            catalog.expect_summary_parents().with(eq("S1")).times(1).returning(move |_| parents());
        }
    }
    let services = TestConfigBuilder::new().configure_catalog(catalog).build();
    seed_cache(&services).await;

    let report = route(&services, &event(event_type, entity_id)).await.unwrap();

    assert_eq!(report.invalidated(), vec![own_key, "transcript:T1", "user-files:U1:*"]);
    assert!(!cached(&services, own_key).await);
    assert!(!cached(&services, "transcript:T1").await);
    assert!(!cached(&services, "user-files:U1:20").await);
    assert!(cached(&services, "file:F1").await);
}

#[rstest]
#[tokio::test]
async fn missing_owner_reference_is_reported_per_step() {
    let mut catalog = MockEntityCatalog::new();
    catalog
        .expect_summary_parents()
        .times(1)
        .returning(|_| Ok(Some(DocumentParents { transcript_id: Some("T1".into()), owner_id: None })));
    let services = TestConfigBuilder::new().configure_catalog(catalog).build();
    seed_cache(&services).await;

    let report = route(&services, &event(EventType::SummarizationComplete, "S1")).await.unwrap();

    assert_eq!(report.invalidated(), vec!["summary:S1", "transcript:T1"]);
    assert_eq!(report.steps.last().map(|step| &step.outcome), Some(&StepOutcome::NotFound));
    assert!(cached(&services, "user-files:U1:10").await);
}

#[rstest]
#[tokio::test]
async fn catalog_failure_stops_the_cascade_with_a_failed_step() {
    let mut catalog = MockEntityCatalog::new();
    catalog.expect_translation_parents().times(1).returning(|_| {
        Err(CatalogError::Network { table: "translations".into(), message: "connection reset".into() })
    });
    let services = TestConfigBuilder::new().configure_catalog(catalog).build();
    seed_cache(&services).await;

    let report = route(&services, &event(EventType::TranslationComplete, "X1")).await.unwrap();

    assert_eq!(report.invalidated(), vec!["translation:X1"]);
    assert_matches!(&report.steps[1].outcome, StepOutcome::Failed { error } if error.contains("connection reset"));
    assert!(cached(&services, "transcript:T1").await);
}

#[rstest]
#[tokio::test]
async fn store_failure_is_recorded_and_the_cascade_continues() {
    let mut catalog = MockEntityCatalog::new();
    catalog
        .expect_translation_parents()
        .times(1)
        .returning(|_| Ok(Some(DocumentParents { transcript_id: Some("T1".into()), owner_id: Some("U1".into()) })));
    let services = TestConfigBuilder::new().configure_catalog(catalog).build();
    services.store.set_available(false);

    let report = route(&services, &event(EventType::TranslationComplete, "X1")).await.unwrap();

    assert_eq!(report.steps.len(), 3);
    assert!(report.steps.iter().all(|step| matches!(step.outcome, StepOutcome::Failed { .. })));
}

#[rstest]
#[tokio::test]
async fn error_status_events_still_invalidate() {
    let mut catalog = MockEntityCatalog::new();
    catalog.expect_transcript_file().times(1).returning(|_| Ok(None));
    let services = TestConfigBuilder::new().configure_catalog(catalog).build();
    seed_cache(&services).await;

    let mut failed = event(EventType::TranscriptionComplete, "T1");
    failed.status = EventStatus::Error;
    failed.error = Some("whisper timeout".to_string());

    InvalidationRouter::route(&failed, services.config.clone()).await.unwrap();
    assert!(!cached(&services, "transcript:T1").await);
}

#[rstest]
#[case::wrong_secret("not-the-secret")]
#[case::empty_secret("")]
#[tokio::test]
async fn invalid_secret_is_rejected_without_side_effects(#[case] secret: &str) {
    let services = TestConfigBuilder::new().build();
    seed_cache(&services).await;

    let mut forged = event(EventType::TranscriptionComplete, "T1");
    forged.secret = secret.to_string();

    let result = InvalidationRouter::route(&forged, services.config.clone()).await;
    assert_eq!(result, Err(WebhookError::Unauthorized));
    assert!(cached(&services, "transcript:T1").await);
}

#[rstest]
#[tokio::test]
async fn unconfigured_secret_rejects_every_event() {
    let services = TestConfigBuilder::new().configure_server_params(ServerParams::default()).build();
    let result = route(&services, &event(EventType::TranscriptionComplete, "T1")).await;
    assert_eq!(result, Err(WebhookError::Unauthorized));
}

#[rstest]
#[tokio::test]
async fn empty_entity_id_is_a_validation_error() {
    let services = TestConfigBuilder::new().build();
    let result = route(&services, &event(EventType::SummarizationComplete, " ")).await;
    assert_matches!(result, Err(WebhookError::Validation(_)));
}

#[rstest]
#[tokio::test]
async fn wildcard_entity_id_only_evicts_its_literal_key() {
    let mut catalog = MockEntityCatalog::new();
    catalog.expect_transcript_file().with(eq("*")).times(1).returning(|_| Ok(None));
    let services = TestConfigBuilder::new().configure_catalog(catalog).build();
    seed_cache(&services).await;
    services.config.cache().put(&CacheKey::Transcript("T2".into()), &"cached").await.unwrap();

    let report = route(&services, &event(EventType::TranscriptionComplete, "*")).await.unwrap();

    assert_eq!(report.steps[0].outcome, StepOutcome::Invalidated { removed: 0 });
    assert!(cached(&services, "transcript:T1").await);
    assert!(cached(&services, "transcript:T2").await);
}

#[rstest]
#[case::matching(TEST_WEBHOOK_SECRET, true)]
#[case::mismatching("guess", false)]
#[case::missing("", false)]
fn authorize_checks_the_configured_secret(#[case] secret: &str, #[case] accepted: bool) {
    let services = TestConfigBuilder::new().build();

    let result = InvalidationRouter::authorize("transcription.complete", secret, &services.config);

    if accepted {
        assert_eq!(result, Ok(()));
    } else {
        assert_eq!(result, Err(WebhookError::Unauthorized));
    }
}
