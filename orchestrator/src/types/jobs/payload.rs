use serde::{Deserialize, Serialize};

use super::types::JobCategory;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionJob {
    pub file_id: String,
    pub user_id: String,
    pub audio_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslationJob {
    pub transcript_id: String,
    pub user_id: String,
    pub target_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SummaryLength {
    Short,
    Medium,
    Detailed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummarizationJob {
    pub transcript_id: String,
    pub user_id: String,
    pub length: SummaryLength,
}

/// Checks that `payload` has the shape producers agreed on for `category`.
///
/// The queue stores payloads opaquely; this check only runs at the enqueue API boundary so
/// that malformed work is rejected before it reaches a processor. Returns a human readable
/// reason on failure.
pub fn validate_payload(category: JobCategory, payload: &serde_json::Value) -> Result<(), String> {
    let result = match category {
        JobCategory::Transcription => serde_json::from_value::<TranscriptionJob>(payload.clone())
            .map(|job| non_empty(&[&job.file_id, &job.audio_url])),
        JobCategory::Translation => serde_json::from_value::<TranslationJob>(payload.clone())
            .map(|job| non_empty(&[&job.transcript_id, &job.target_language])),
        JobCategory::Summarization => {
            serde_json::from_value::<SummarizationJob>(payload.clone()).map(|job| non_empty(&[&job.transcript_id]))
        }
    };

    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(format!("{} payload has empty identifiers", category)),
        Err(e) => Err(format!("invalid {} payload: {}", category, e)),
    }
}

fn non_empty(values: &[&String]) -> bool {
    values.iter().all(|v| !v.trim().is_empty())
}
