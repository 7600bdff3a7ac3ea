use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::types::jobs::JobCategory;

/// Completion notifications emitted by the external processors
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EventType {
    #[serde(rename = "transcription.complete")]
    #[strum(serialize = "transcription.complete")]
    TranscriptionComplete,
    #[serde(rename = "translation.complete")]
    #[strum(serialize = "translation.complete")]
    TranslationComplete,
    #[serde(rename = "summarization.complete")]
    #[strum(serialize = "summarization.complete")]
    SummarizationComplete,
}

impl EventType {
    pub fn category(&self) -> JobCategory {
        match self {
            EventType::TranscriptionComplete => JobCategory::Transcription,
            EventType::TranslationComplete => JobCategory::Translation,
            EventType::SummarizationComplete => JobCategory::Summarization,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    Completed,
    Error,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WebhookData {
    pub id: String,
    pub status: EventStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Wire format of the completion webhook body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub data: WebhookData,
    /// A missing secret deserializes as empty and is rejected as unauthorized
    #[serde(default)]
    pub secret: String,
}

/// Validated-on-use completion event. Never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub event_type: EventType,
    pub entity_id: String,
    pub status: EventStatus,
    pub error: Option<String>,
    pub secret: String,
}

impl From<WebhookPayload> for WebhookEvent {
    fn from(payload: WebhookPayload) -> Self {
        Self {
            event_type: payload.event_type,
            entity_id: payload.data.id,
            status: payload.data.status,
            error: payload.data.error,
            secret: payload.secret,
        }
    }
}
