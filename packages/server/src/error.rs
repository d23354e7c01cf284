use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::UnknownFieldTag;
use common::storage::StorageError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Error code. One of: `VALIDATION_ERROR`, `MISSING_PARAMETER`,
    /// `NO_FILES_PROVIDED`, `UNKNOWN_FIELD_TAG`, `RECORD_NOT_FOUND`, `NOT_FOUND`,
    /// `DUPLICATE_KEY`, `PAYLOAD_TOO_LARGE`, `STORE_UNAVAILABLE`, `INTERNAL_ERROR`.
    #[schema(example = "MISSING_PARAMETER")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "applicationNumber is required")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// A required query or path value is absent. Holds the parameter name.
    MissingParameter(&'static str),
    NoFilesProvided,
    UnknownFieldTag(String),
    /// No student record for the application number.
    RecordNotFound(String),
    NotFound(String),
    DuplicateKey(String),
    /// Holds the limit in bytes.
    PayloadTooLarge { limit: u64 },
    StoreUnavailable,
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
            AppError::MissingParameter(name) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "MISSING_PARAMETER",
                    message: format!("{name} is required"),
                },
            ),
            AppError::NoFilesProvided => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "NO_FILES_PROVIDED",
                    message: "No files were uploaded".into(),
                },
            ),
            AppError::UnknownFieldTag(tag) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "UNKNOWN_FIELD_TAG",
                    message: format!("Unknown document field '{tag}'"),
                },
            ),
            AppError::RecordNotFound(application_number) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "RECORD_NOT_FOUND",
                    message: format!("Student '{application_number}' not found"),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::DuplicateKey(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "DUPLICATE_KEY",
                    message: msg,
                },
            ),
            AppError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    code: "PAYLOAD_TOO_LARGE",
                    message: format!("Upload exceeds maximum size of {limit} bytes"),
                },
            ),
            AppError::StoreUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    code: "STORE_UNAVAILABLE",
                    message: "File storage is not ready yet, try again shortly".into(),
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
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::warn!("Unique constraint violated: {detail}");
                AppError::DuplicateKey("A record with this key already exists".into())
            }
            _ => AppError::Internal(err.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => AppError::NotFound(format!("File '{what}' not found")),
            StorageError::InvalidId(msg) => AppError::Validation(msg),
            StorageError::SizeLimitExceeded { limit, .. } => AppError::PayloadTooLarge { limit },
            StorageError::Unavailable => AppError::StoreUnavailable,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<UnknownFieldTag> for AppError {
    fn from(err: UnknownFieldTag) -> Self {
        AppError::UnknownFieldTag(err.0)
    }
}
