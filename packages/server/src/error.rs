use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::store::StoreError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `IDENTITY_MISSING`, `IDENTITY_INVALID`, `PERMISSION_DENIED`,
    /// `NOT_FOUND`, `CONTEST_PAUSED`, `CONFLICT`, `DEADLINE_EXCEEDED`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Flag must be 1-256 characters")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    IdentityMissing,
    IdentityInvalid,
    PermissionDenied,
    NotFound(String),
    /// Submissions are rejected platform-wide while the contest is paused.
    ContestPaused,
    Conflict(String),
    /// The request-scoped storage deadline expired before the operation
    /// finished. Nothing is retried automatically.
    Timeout,
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::IdentityMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "IDENTITY_MISSING",
                    message: "Actor identity required".into(),
                },
            ),
            AppError::IdentityInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "IDENTITY_INVALID",
                    message: "Malformed actor identity".into(),
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: "Insufficient permissions".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::ContestPaused => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "CONTEST_PAUSED",
                    message: "The contest is paused; submissions are closed".into(),
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorBody {
                    code: "DEADLINE_EXCEEDED",
                    message: "The operation did not complete in time".into(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("Record not found".into()),
            // Conflicts on the solve and achievement paths are absorbed
            // inside the engine; one reaching this conversion comes from
            // an administrative write.
            StoreError::Conflict => AppError::Conflict("Already exists".into()),
            StoreError::Backend(e) => AppError::Internal(e.to_string()),
        }
    }
}
