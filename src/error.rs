//! Error types for the bookloan server

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Field name to the list of messages raised against it
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Stable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthenticated = 2,
    NotAuthorized = 3,
    DbFailure = 4,
    NoSuchRecord = 5,
    BadValue = 6,
    BookNotAvailable = 7,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {message}")]
    InvalidFields {
        code: ErrorCode,
        message: String,
        fields: FieldErrors,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure attached to a single input field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.clone()]);
        AppError::InvalidFields {
            code: ErrorCode::BadValue,
            message,
            fields,
        }
    }

    /// The requested book has no copy left to lend
    pub fn book_not_available(book_id: i32) -> Self {
        let message = "Book is not available".to_string();
        let mut fields = FieldErrors::new();
        fields.insert("book".to_string(), vec![message.clone()]);
        tracing::debug!(book_id, "borrow refused, inventory exhausted");
        AppError::InvalidFields {
            code: ErrorCode::BookNotAvailable,
            message,
            fields,
        }
    }

    /// Map Postgres CHECK and range violations on inventory into client errors.
    pub(crate) fn from_write(e: sqlx::Error) -> Self {
        let code = match &e {
            sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
            _ => None,
        };
        match code.as_deref() {
            // check_violation
            Some("23514") => AppError::invalid_field("inventory", "Inventory must not be negative"),
            // numeric_value_out_of_range
            Some("22003") => AppError::inventory_overflow(),
            _ => AppError::Database(e),
        }
    }

    pub fn inventory_overflow() -> Self {
        AppError::invalid_field("inventory", "Inventory is already at its maximum")
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: FieldErrors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        AppError::InvalidFields {
            code: ErrorCode::BadValue,
            message: "Invalid input".to_string(),
            fields,
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorResponse) {
        let (status, code, message, fields) = match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated, msg, None)
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg, None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord, msg, None),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg, None),
            AppError::InvalidFields {
                code,
                message,
                fields,
            } => (StatusCode::BAD_REQUEST, code, message, Some(fields)),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            fields,
        };
        (status, body)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
