use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::ApiResponse;
use crate::worker::{DispatchError, WebhookError};

pub type ApiServiceResult<T> = Result<T, ApiServiceError>;

/// Errors a route handler can answer with.
///
/// # Status Code Mapping
/// * `InvalidRequest` -> 400 Bad Request
/// * `Unauthorized` -> 401 Unauthorized
/// * `AlreadyRunning` -> 409 Conflict
/// * `RateLimited` -> 429 Too Many Requests
/// * `StoreUnavailable` -> 500 Internal Server Error
/// * `Internal` -> 500 Internal Server Error
#[derive(Debug, thiserror::Error)]
pub enum ApiServiceError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Another processor is already running")]
    AlreadyRunning,

    #[error("Rate limit exceeded: {count} requests, limit is {limit}")]
    RateLimited { count: i64, limit: u64 },

    #[error("{0}")]
    StoreUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiServiceError::AlreadyRunning => StatusCode::CONFLICT,
            ApiServiceError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiServiceError::StoreUnavailable(_) | ApiServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// All errors are answered as `{"success": false, "error": "..."}`.
impl IntoResponse for ApiServiceError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ApiResponse::error(self.to_string()))).into_response()
    }
}

impl From<WebhookError> for ApiServiceError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::Unauthorized => ApiServiceError::Unauthorized(err.to_string()),
            WebhookError::Validation(_) => ApiServiceError::InvalidRequest(err.to_string()),
        }
    }
}

impl From<DispatchError> for ApiServiceError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Lock(_) | DispatchError::Queue(_) => ApiServiceError::StoreUnavailable(err.to_string()),
            DispatchError::Panicked { .. } => ApiServiceError::Internal(err.to_string()),
        }
    }
}
