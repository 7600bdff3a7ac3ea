use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::JobCategory;

/// Envelope stored in a category queue.
///
/// The payload is opaque to the queue; only the producer and the processor of the category
/// interpret it. `enqueued_at` is informational (the list position gives the FIFO order) and is
/// used by the monitor to compute the age of the oldest pending job.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub category: JobCategory,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
    /// Number of earlier processing attempts of this job
    #[serde(default)]
    pub attempt: u32,
}

impl Job {
    pub fn new(category: JobCategory, payload: serde_json::Value) -> Self {
        Self { id: Uuid::new_v4(), category, payload, enqueued_at: Utc::now(), attempt: 0 }
    }

    /// The same job, marked for another attempt. The original enqueue time is kept.
    pub fn next_attempt(&self) -> Self {
        Self { attempt: self.attempt + 1, ..self.clone() }
    }

    /// Whole seconds spent in the queue as of `now`. Never negative.
    pub fn age_seconds(&self, now: DateTime<Utc>) -> u64 {
        (now - self.enqueued_at).num_seconds().max(0) as u64
    }
}
