use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use tracing::{debug, instrument};
use url::Url;

use super::{JobProcessor, ProcessorError};
use crate::types::jobs::payload::{SummarizationJob, TranscriptionJob, TranslationJob};
use crate::types::jobs::{Job, JobCategory};
use crate::types::params::FunctionsParams;

/// Name of the external function processing a category
pub fn function_name(category: JobCategory) -> &'static str {
    match category {
        JobCategory::Transcription => "whisper-transcribe",
        JobCategory::Translation => "translate-text",
        JobCategory::Summarization => "summarize-text",
    }
}

/// Processes jobs by POSTing them to the external functions, one function per category.
pub struct HttpProcessor {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpProcessor {
    pub fn new(params: &FunctionsParams) -> Result<Self, ProcessorError> {
        let client = reqwest::Client::builder().timeout(params.timeout).build().map_err(|e| {
            ProcessorError::Network { function: "client".to_string(), message: e.to_string() }
        })?;
        Ok(Self { client, base_url: params.base_url.clone(), token: params.token.clone() })
    }

    fn function_url(&self, function: &str) -> Result<Url, ProcessorError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProcessorError::Url {
                function: function.to_string(),
                message: "base URL cannot be a base".into(),
            })?
            .pop_if_empty()
            .push(function);
        Ok(url)
    }

    /// Request body of the function. Only the fields the function consumes are forwarded.
    fn request_body(job: &Job) -> Result<Value, ProcessorError> {
        let invalid =
            |e: serde_json::Error| ProcessorError::InvalidPayload { category: job.category, message: e.to_string() };
        let body = match job.category {
            JobCategory::Transcription => {
                let payload: TranscriptionJob = serde_json::from_value(job.payload.clone()).map_err(invalid)?;
                json!({ "fileId": payload.file_id, "audioUrl": payload.audio_url, "language": payload.language })
            }
            JobCategory::Translation => {
                let payload: TranslationJob = serde_json::from_value(job.payload.clone()).map_err(invalid)?;
                json!({
                    "transcriptId": payload.transcript_id,
                    "targetLanguage": payload.target_language,
                    "sourceLanguage": payload.source_language,
                })
            }
            JobCategory::Summarization => {
                let payload: SummarizationJob = serde_json::from_value(job.payload.clone()).map_err(invalid)?;
                json!({ "transcriptId": payload.transcript_id, "length": payload.length })
            }
        };
        Ok(body)
    }
}

#[async_trait]
impl JobProcessor for HttpProcessor {
    #[instrument(skip(self, job), fields(category = %job.category, job_id = %job.id))]
    async fn process(&self, job: &Job) -> Result<(), ProcessorError> {
        let function = function_name(job.category);
        let url = self.function_url(function)?;
        let body = Self::request_body(job)?;

        let mut request = self.client.post(url).header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| ProcessorError::Network { function: function.to_string(), message: e.to_string() })?;

        let status = response.status();
        if status.is_success() {
            debug!(function = %function, %status, "Function invocation succeeded");
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(ProcessorError::Api { function: function.to_string(), status, message })
    }
}
