use reqwest::StatusCode;
use thiserror::Error;

use crate::types::jobs::JobCategory;

#[derive(Error, Debug)]
pub enum ProcessorError {
    /// Transport failure before a response was received (timeouts included)
    #[error("Network error while invoking {function}: {message}")]
    Network { function: String, message: String },

    /// The function answered with a non-success status
    #[error("{function} returned status {status}: {message}")]
    Api { function: String, status: StatusCode, message: String },

    /// The job payload does not have the shape the category expects
    #[error("Invalid {category} payload: {message}")]
    InvalidPayload { category: JobCategory, message: String },

    #[error("Failed to build URL for {function}: {message}")]
    Url { function: String, message: String },
}
