//! Error types for engagement-daemon

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engagement_types::WorkflowError;
use serde::Serialize;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Transition not legal from the current state
    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    /// Actor's role may not initiate the action
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Guard preconditions unmet, all blockers listed
    #[error("Preconditions not met")]
    PreconditionFailed(Vec<String>),

    /// Content changed since a sign-off was recorded
    #[error("Content modified since sign-off")]
    IntegrityMismatch,

    /// The caller's version observation is out of date
    #[error("Stale write: expected version {expected}, found {found}")]
    StaleWrite { expected: u64, found: u64 },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::IllegalTransition { state, action } => {
                ApiError::IllegalTransition(format!("'{}' from state '{}'", action, state))
            }
            WorkflowError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            WorkflowError::PreconditionFailed(blockers) => ApiError::PreconditionFailed(blockers),
            WorkflowError::IntegrityMismatch => ApiError::IntegrityMismatch,
            WorkflowError::StaleWrite { expected, found } => {
                ApiError::StaleWrite { expected, found }
            }
            WorkflowError::NotFound(msg) => ApiError::NotFound(msg),
            WorkflowError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockers: Option<Vec<String>>,
    /// Set only on stale writes so the caller can retry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_version: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::IllegalTransition(_) => (StatusCode::CONFLICT, "ILLEGAL_TRANSITION"),
            ApiError::Unauthorized(_) => (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
            ApiError::PreconditionFailed(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "PRECONDITION_FAILED")
            }
            ApiError::IntegrityMismatch => (StatusCode::CONFLICT, "INTEGRITY_MISMATCH"),
            ApiError::StaleWrite { .. } => (StatusCode::CONFLICT, "STALE_WRITE"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let blockers = match &self {
            ApiError::PreconditionFailed(blockers) => Some(blockers.clone()),
            _ => None,
        };
        let current_version = match &self {
            ApiError::StaleWrite { found, .. } => Some(*found),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            blockers,
            current_version,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
