use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::core::client::cache::CacheKey;
use crate::core::client::catalog::{CatalogError, DocumentParents};
use crate::core::config::Config;
use crate::types::webhook::{EventStatus, EventType, WebhookEvent};
use crate::utils::secret_matches;
use crate::worker::metrics;

#[derive(Error, Debug, PartialEq)]
pub enum WebhookError {
    #[error("Invalid webhook secret")]
    Unauthorized,

    #[error("Invalid payload format: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum StepOutcome {
    /// The cache key (or pattern) was invalidated; `removed` entries existed
    Invalidated { removed: u64 },
    /// The key could not be derived because a referenced entity does not exist
    NotFound,
    Failed { error: String },
}

impl StepOutcome {
    fn label(&self) -> &'static str {
        match self {
            StepOutcome::Invalidated { .. } => "invalidated",
            StepOutcome::NotFound => "not_found",
            StepOutcome::Failed { .. } => "failed",
        }
    }
}

/// One cache invalidation of a cascade. `target` is the cache key, or a description of it when
/// the key could not be derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidationStep {
    pub target: String,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationReport {
    pub event_type: EventType,
    pub entity_id: String,
    pub steps: Vec<InvalidationStep>,
}

impl InvalidationReport {
    fn new(event: &WebhookEvent) -> Self {
        Self { event_type: event.event_type, entity_id: event.entity_id.clone(), steps: Vec::new() }
    }

    /// Keys that were invalidated, in cascade order
    pub fn invalidated(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|step| matches!(step.outcome, StepOutcome::Invalidated { .. }))
            .map(|step| step.target.as_str())
            .collect()
    }

    /// Whether every step of the cascade invalidated its key
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|step| matches!(step.outcome, StepOutcome::Invalidated { .. }))
    }

    fn push(&mut self, target: String, outcome: StepOutcome) {
        metrics::record_invalidation_step(self.event_type, outcome.label());
        match &outcome {
            StepOutcome::Invalidated { removed } => debug!(target = %target, removed, "Cache invalidated"),
            StepOutcome::NotFound => info!(target = %target, "Invalidation cascade stopped, entity not found"),
            StepOutcome::Failed { error } => warn!(target = %target, error = %error, "Invalidation step failed"),
        }
        self.steps.push(InvalidationStep { target, outcome });
    }
}

/// Evicts the cache entries depending on an entity that an external processor just changed.
pub struct InvalidationRouter;

impl InvalidationRouter {
    /// Checks a webhook secret against the configured one, counting rejections under
    /// `event_type`. Callers that read the secret before the rest of the payload use this
    /// directly; `route` calls it for every event.
    pub fn authorize(event_type: &str, secret: &str, config: &Config) -> Result<(), WebhookError> {
        if secret_matches(config.server_params().webhook_secret.as_deref(), secret) {
            return Ok(());
        }
        warn!(event_type, "Rejected webhook with invalid secret");
        metrics::record_webhook_event(event_type, "unauthorized");
        Err(WebhookError::Unauthorized)
    }

    /// Authenticates the event and runs the invalidation cascade of its type.
    ///
    /// A failed invalidation is recorded and the cascade continues; a failed or empty lookup
    /// ends it, since the following keys cannot be derived. Only authentication and validation
    /// failures are errors.
    #[instrument(skip_all, fields(event_type = %event.event_type, entity_id = %event.entity_id))]
    pub async fn route(event: &WebhookEvent, config: Arc<Config>) -> Result<InvalidationReport, WebhookError> {
        Self::authorize(&event.event_type.to_string(), &event.secret, &config)?;
        if event.entity_id.trim().is_empty() {
            metrics::record_webhook_event(&event.event_type.to_string(), "invalid");
            return Err(WebhookError::Validation("data.id must not be empty".to_string()));
        }
        if event.status == EventStatus::Error {
            warn!(error = ?event.error, "Processor reported an error, invalidating anyway");
        }

        let cascade = Cascade { config: &config, report: InvalidationReport::new(event) };
        let report = match event.event_type {
            EventType::TranscriptionComplete => cascade.transcription(&event.entity_id).await,
            EventType::TranslationComplete => cascade.translation(&event.entity_id).await,
            EventType::SummarizationComplete => cascade.summarization(&event.entity_id).await,
        };

        let result = if report.is_complete() { "complete" } else { "partial" };
        metrics::record_webhook_event(&event.event_type.to_string(), result);
        info!(steps = report.steps.len(), invalidated = report.invalidated().len(), "Processed webhook event");
        Ok(report)
    }
}

struct Cascade<'a> {
    config: &'a Config,
    report: InvalidationReport,
}

impl Cascade<'_> {
    async fn invalidate(&mut self, key: CacheKey) {
        let outcome = match self.config.cache().evict(&key).await {
            Ok(removed) => StepOutcome::Invalidated { removed },
            Err(e) => StepOutcome::Failed { error: e.to_string() },
        };
        self.report.push(key.key(), outcome);
    }

    /// Unwraps a lookup result, recording the step that cannot run when it yields nothing
    fn resolve<T>(&mut self, target: String, lookup: Result<Option<T>, CatalogError>) -> Option<T> {
        match lookup {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                self.report.push(target, StepOutcome::NotFound);
                None
            }
            Err(e) => {
                error!(target = %target, error = %e, "Catalog lookup failed");
                self.report.push(target, StepOutcome::Failed { error: e.to_string() });
                None
            }
        }
    }

    /// `transcript:T` → `file:<file of T>` → `user-files:<owner of file>:*`
    async fn transcription(mut self, transcript_id: &str) -> InvalidationReport {
        self.invalidate(CacheKey::Transcript(transcript_id.to_string())).await;

        let lookup = self.config.catalog().transcript_file(transcript_id).await;
        let Some(file_id) = self.resolve(format!("file of transcript {}", transcript_id), lookup) else {
            return self.report;
        };
        self.invalidate(CacheKey::File(file_id.clone())).await;

        let lookup = self.config.catalog().file_owner(&file_id).await;
        let Some(owner_id) = self.resolve(format!("owner of file {}", file_id), lookup) else {
            return self.report;
        };
        self.invalidate(CacheKey::UserFilesAll(owner_id)).await;
        self.report
    }

    /// `translation:X` → `transcript:<parent>`, `user-files:<owner>:*`
    async fn translation(mut self, translation_id: &str) -> InvalidationReport {
        self.invalidate(CacheKey::Translation(translation_id.to_string())).await;
        let lookup = self.config.catalog().translation_parents(translation_id).await;
        let target = format!("parents of translation {}", translation_id);
        self.document_parents(target, lookup).await
    }

    /// `summary:S` → `transcript:<parent>`, `user-files:<owner>:*`
    async fn summarization(mut self, summary_id: &str) -> InvalidationReport {
        self.invalidate(CacheKey::Summary(summary_id.to_string())).await;
        let lookup = self.config.catalog().summary_parents(summary_id).await;
        let target = format!("parents of summary {}", summary_id);
        self.document_parents(target, lookup).await
    }

    async fn document_parents(
        mut self,
        target: String,
        lookup: Result<Option<DocumentParents>, CatalogError>,
    ) -> InvalidationReport {
        let Some(parents) = self.resolve(target.clone(), lookup) else {
            return self.report;
        };
        match parents.transcript_id {
            Some(transcript_id) => self.invalidate(CacheKey::Transcript(transcript_id)).await,
            None => self.report.push(format!("transcript of {}", target), StepOutcome::NotFound),
        }
        match parents.owner_id {
            Some(owner_id) => self.invalidate(CacheKey::UserFilesAll(owner_id)).await,
            None => self.report.push(format!("owner of {}", target), StepOutcome::NotFound),
        }
        self.report
    }
}
