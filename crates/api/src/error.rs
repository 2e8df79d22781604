use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use storefront_core::error::CoreError;
use storefront_core::import::ImportError;
use storefront_storage::StorageError;

/// Whether error bodies carry a `details` field with the underlying error text.
static EXPOSE_DETAILS: OnceLock<bool> = OnceLock::new();

/// Set once at startup. Defaults to exposing details (non-production).
pub fn init_error_details(expose: bool) {
    let _ = EXPOSE_DETAILS.set(expose);
}

fn details_enabled() -> bool {
    *EXPOSE_DETAILS.get().unwrap_or(&true)
}

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `storefront_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Import(#[from] ImportError),

    /// Request body failed `validator` checks; `details` maps field to errors.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        details: serde_json::Value,
    },

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::NotFoundBy {
                    entity,
                    field,
                    value,
                } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with {field} '{value}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            AppError::Storage(StorageError::InvalidKey(key)) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                format!("Invalid object key '{key}'"),
            ),
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Storage error");
                internal()
            }

            AppError::Import(err) => (StatusCode::BAD_REQUEST, "INVALID_CSV", err.to_string()),

            // --- HTTP-specific errors ---
            AppError::Validation { message, .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.clone())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });

        if let AppError::Validation { details, .. } = &self {
            body["details"] = details.clone();
        } else if details_enabled() && exposes_cause(&self) {
            body["details"] = json!(self.to_string());
        }

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Errors whose public message hides the underlying cause.
fn exposes_cause(err: &AppError) -> bool {
    matches!(
        err,
        AppError::Database(_)
            | AppError::Storage(_)
            | AppError::InternalError(_)
            | AppError::Core(CoreError::Internal(_))
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// | SQLSTATE | Meaning            | Status |
/// |----------|--------------------|--------|
/// | `23505`  | unique violation   | 409    |
/// | `23503`  | foreign key        | 409    |
/// | `23514`  | check constraint   | 400    |
/// | `42501`  | permission denied  | 403    |
///
/// `RowNotFound` maps to 404; everything else is a sanitized 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                Some("23505") => (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                ),
                Some("23503") => (
                    StatusCode::CONFLICT,
                    "FOREIGN_KEY_VIOLATION",
                    format!("Referenced record is missing or still in use: {constraint}"),
                ),
                Some("23514") => (
                    StatusCode::BAD_REQUEST,
                    "CONSTRAINT_VIOLATION",
                    format!("Value violates check constraint: {constraint}"),
                ),
                Some("42501") => (
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Permission denied".to_string(),
                ),
                _ => {
                    tracing::error!(error = %db_err, "Database error");
                    internal()
                }
            }
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
