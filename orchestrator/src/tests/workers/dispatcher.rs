use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use reqwest::StatusCode;
use rstest::*;
use serde_json::json;
use tokio::sync::Notify;

use crate::core::client::processor::{MockJobProcessor, ProcessorError};
use crate::core::client::{JobProcessor, LockResult};
use crate::tests::config::{TestConfig, TestConfigBuilder};
use crate::types::jobs::{Job, JobCategory};
use crate::types::params::ServiceParams;
use crate::worker::{DispatchError, DispatchOutcome, ProcessingDispatcher};

const CATEGORY: JobCategory = JobCategory::Transcription;

fn processor_returning(times: usize, result: fn() -> Result<(), ProcessorError>) -> MockJobProcessor {
    let mut processor = MockJobProcessor::new();
    processor.expect_process().times(times).returning(move |_| result());
    processor
}

fn api_failure() -> Result<(), ProcessorError> {
    Err(ProcessorError::Api {
        function: "whisper-transcribe".to_string(),
        status: StatusCode::BAD_GATEWAY,
        message: "model unavailable".to_string(),
    })
}

async fn lock_is_free(services: &TestConfig) -> bool {
    !services.config.lock().is_locked(&CATEGORY.lock_name()).await.unwrap()
}

#[rstest]
#[tokio::test]
async fn empty_queue_reports_no_work_and_releases_lock() {
    let services = TestConfigBuilder::new().build();

    let outcome = ProcessingDispatcher::process_next(CATEGORY, None, services.config.clone()).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::NoWork);
    assert_eq!(outcome.message(), "No jobs in queue");
    assert!(lock_is_free(&services).await);
}

#[rstest]
#[tokio::test]
async fn processes_exactly_one_job_in_fifo_order() {
    let mut processor = MockJobProcessor::new();
    processor
        .expect_process()
        .withf(|job: &Job| job.payload["fileId"] == "F1")
        .times(1)
        .returning(|_| Ok(()));
    let services = TestConfigBuilder::new().configure_processor(processor).build();
    let queue = services.config.queue();
    let first = queue.enqueue(CATEGORY, json!({"fileId": "F1"})).await.unwrap();
    queue.enqueue(CATEGORY, json!({"fileId": "F2"})).await.unwrap();

    let outcome = ProcessingDispatcher::process_next(CATEGORY, None, services.config.clone()).await.unwrap();

    assert_eq!(
        outcome,
        DispatchOutcome::Processed {
            job_id: first.id,
            success: true,
            message: "Transcription completed".to_string(),
            requeued: false,
        }
    );
    assert_eq!(queue.size(CATEGORY).await.unwrap(), 1);
    let counters = services.config.queue_metrics().read(CATEGORY).await.unwrap();
    assert_eq!((counters.processed, counters.errors), (1, 0));
    assert!(lock_is_free(&services).await);
}

#[rstest]
#[tokio::test]
async fn failed_job_is_lost_without_retries() {
    let services = TestConfigBuilder::new().configure_processor(processor_returning(1, api_failure)).build();
    let job = services.config.queue().enqueue(CATEGORY, json!({"fileId": "F1"})).await.unwrap();

    let outcome = ProcessingDispatcher::process_next(CATEGORY, None, services.config.clone()).await.unwrap();

    assert_matches!(
        outcome,
        DispatchOutcome::Processed { job_id, success: false, requeued: false, ref message }
            if job_id == job.id && message.contains("model unavailable")
    );
    assert_eq!(services.config.queue().size(CATEGORY).await.unwrap(), 0);
    let counters = services.config.queue_metrics().read(CATEGORY).await.unwrap();
    assert_eq!((counters.processed, counters.errors), (0, 1));
    assert!(lock_is_free(&services).await);
}

#[rstest]
#[tokio::test]
async fn failed_job_is_requeued_until_retries_are_exhausted() {
    let params = ServiceParams { max_job_retries: 2, ..ServiceParams::default() };
    let services = TestConfigBuilder::new()
        .configure_processor(processor_returning(3, api_failure))
        .configure_service_params(params)
        .build();
    let job = services.config.queue().enqueue(CATEGORY, json!({"fileId": "F1"})).await.unwrap();

    for expected_requeue in [true, true, false] {
        let outcome = ProcessingDispatcher::process_next(CATEGORY, None, services.config.clone()).await.unwrap();
        assert_matches!(outcome, DispatchOutcome::Processed { job_id, requeued, .. }
            if job_id == job.id && requeued == expected_requeue);
    }
    assert_eq!(services.config.queue().size(CATEGORY).await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn held_lock_reports_already_running_without_touching_the_queue() {
    let services = TestConfigBuilder::new().build();
    services.config.queue().enqueue(CATEGORY, json!({"fileId": "F1"})).await.unwrap();
    let held = services.config.lock().acquire(&CATEGORY.lock_name(), 60).await.unwrap();
    assert_matches!(held, LockResult::Acquired(_));

    let outcome = ProcessingDispatcher::process_next(CATEGORY, None, services.config.clone()).await.unwrap();

    assert_eq!(outcome, DispatchOutcome::AlreadyRunning);
    assert_eq!(services.config.queue().size(CATEGORY).await.unwrap(), 1);
    // The contending call must not release someone else's lock
    assert!(!lock_is_free(&services).await);
}

#[rstest]
#[tokio::test]
async fn other_categories_are_not_blocked_by_a_held_lock() {
    let mut processor = MockJobProcessor::new();
    processor.expect_process().times(1).returning(|_| Ok(()));
    let services = TestConfigBuilder::new().configure_processor(processor).build();
    services.config.lock().acquire(&CATEGORY.lock_name(), 60).await.unwrap();
    services.config.queue().enqueue(JobCategory::Translation, json!({"transcriptId": "T1"})).await.unwrap();

    let outcome =
        ProcessingDispatcher::process_next(JobCategory::Translation, None, services.config.clone()).await.unwrap();
    assert_matches!(outcome, DispatchOutcome::Processed { success: true, .. });
}

/// Blocks inside `process` until the test lets it continue
struct GatedProcessor {
    started: Notify,
    proceed: Notify,
}

#[async_trait]
impl JobProcessor for GatedProcessor {
    async fn process(&self, _job: &Job) -> Result<(), ProcessorError> {
        self.started.notify_one();
        self.proceed.notified().await;
        Ok(())
    }
}

#[rstest]
#[tokio::test]
async fn concurrent_invocation_is_rejected_while_a_job_runs() {
    let gate = Arc::new(GatedProcessor { started: Notify::new(), proceed: Notify::new() });
    let services = TestConfigBuilder::new().configure_shared_processor(gate.clone()).build();
    for n in 0..2 {
        services.config.queue().enqueue(CATEGORY, json!({"n": n})).await.unwrap();
    }

    let running = tokio::spawn(ProcessingDispatcher::process_next(CATEGORY, Some(30), services.config.clone()));
    gate.started.notified().await;

    assert_eq!(services.config.lock().ttl(&CATEGORY.lock_name()).await.unwrap(), Some(30));
    let second = ProcessingDispatcher::process_next(CATEGORY, None, services.config.clone()).await.unwrap();
    assert_eq!(second, DispatchOutcome::AlreadyRunning);

    gate.proceed.notify_one();
    let first = running.await.unwrap().unwrap();
    assert_matches!(first, DispatchOutcome::Processed { success: true, .. });
    assert_eq!(services.config.queue().size(CATEGORY).await.unwrap(), 1);
    assert!(lock_is_free(&services).await);
}

struct PanickingProcessor;

#[async_trait]
impl JobProcessor for PanickingProcessor {
    async fn process(&self, _job: &Job) -> Result<(), ProcessorError> {
        panic!("processor crashed")
    }
}

#[rstest]
#[tokio::test]
async fn panic_inside_processing_still_releases_the_lock() {
    let services = TestConfigBuilder::new().configure_processor(PanickingProcessor).build();
    services.config.queue().enqueue(CATEGORY, json!({"fileId": "F1"})).await.unwrap();

    let result = ProcessingDispatcher::process_next(CATEGORY, None, services.config.clone()).await;

    assert_matches!(
        result,
        Err(DispatchError::Panicked { category: CATEGORY, ref message }) if message == "processor crashed"
    );
    assert!(lock_is_free(&services).await);
}

#[rstest]
#[tokio::test]
async fn store_outage_is_an_error_not_an_empty_queue() {
    let services = TestConfigBuilder::new().build();
    services.store.set_available(false);

    let result = ProcessingDispatcher::process_next(CATEGORY, None, services.config.clone()).await;
    assert_matches!(result, Err(DispatchError::Lock(_)));
}
