use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, model::LifelineKind};

/// Errors produced by engine operations.
///
/// Every command either commits a new session version or returns exactly one
/// of these; nothing is dropped silently.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Creation input is malformed; the caller must fix it before retrying.
    #[error("invalid input: {0}")]
    Validation(String),
    /// The acting player does not hold the turn (and no override applies).
    #[error("not your turn: {0}")]
    NotYourTurn(String),
    /// The referenced question or answer is not selectable in this state.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    /// The lifeline counter is already at zero.
    #[error("no {0:?} lifeline uses left")]
    LifelineExhausted(LifelineKind),
    /// The session changed since it was read; re-read and retry the command.
    #[error("session was modified concurrently (expected version {expected})")]
    ConcurrentModification {
        /// Version the command was computed against.
        expected: u64,
    },
    /// The referenced session or player does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// A storage or directory dependency failed; retryable with backoff.
    #[error("dependency unavailable")]
    Unavailable(#[source] StorageError),
    /// No session store is installed; the engine runs degraded.
    #[error("session store unavailable (degraded mode)")]
    Degraded,
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { expected, .. } => {
                EngineError::ConcurrentModification { expected }
            }
            StorageError::NotFound { ref what } => EngineError::NotFound(what.clone()),
            other => EngineError::Unavailable(other),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {err}"))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Caller is not allowed to perform the action.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(message) => AppError::BadRequest(message),
            EngineError::NotYourTurn(message) => AppError::Forbidden(message),
            EngineError::InvalidSelection(message) => AppError::Conflict(message),
            EngineError::LifelineExhausted(kind) => {
                AppError::Conflict(format!("no {kind:?} lifeline uses left"))
            }
            EngineError::ConcurrentModification { expected } => AppError::Conflict(format!(
                "session was modified concurrently (expected version {expected}); re-read and retry"
            )),
            EngineError::NotFound(message) => AppError::NotFound(message),
            EngineError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            EngineError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
