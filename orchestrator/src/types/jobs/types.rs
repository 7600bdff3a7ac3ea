use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// A named class of background work. Every category owns its own queue, lock and metrics.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobCategory {
    /// Speech to text for an uploaded audio file
    Transcription,
    /// Translation of an existing transcript
    Translation,
    /// Summary of an existing transcript
    Summarization,
}

impl JobCategory {
    /// Key of the list holding the pending jobs of this category
    pub fn queue_key(&self) -> String {
        format!("queue:{}", self)
    }

    /// Name of the lock serializing the processing of this category
    pub fn lock_name(&self) -> String {
        format!("queue_processor:{}", self)
    }

    /// Key of the hash holding the processing counters of this category
    pub fn metrics_key(&self) -> String {
        format!("queue:{}:metrics", self)
    }

    /// Message reported after a job of this category was processed successfully
    pub fn completed_message(&self) -> &'static str {
        match self {
            JobCategory::Transcription => "Transcription completed",
            JobCategory::Translation => "Translation completed",
            JobCategory::Summarization => "Summarization completed",
        }
    }
}
