//! Error types for the booking server

use axum::{
    extract::rejection::{FormRejection, QueryRejection},
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveTime;
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

/// Field-level messages keyed by form field name, in the order they were found
pub type FieldErrors = IndexMap<String, String>;

/// Stable error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    BadValue = 2,
    NotFound = 3,
    SlotUnavailable = 4,
    CatalogUnavailable = 5,
    StoreUnavailable = 6,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0:?}")]
    Validation(FieldErrors),

    #[error("Not found: {0:?}")]
    NotFound(FieldErrors),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        /// Fresh start times offered to the client; None when they could not be read
        available_slots: Option<Vec<NaiveTime>>,
    },

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Booking store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Single-field validation error
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(IndexMap::from([(field.to_string(), message.into())]))
    }

    /// Single-field not-found error
    pub fn not_found(field: &str, message: impl Into<String>) -> Self {
        AppError::NotFound(IndexMap::from([(field.to_string(), message.into())]))
    }

    /// The requested slot was taken by another booking
    pub fn slot_taken() -> Self {
        AppError::Conflict {
            message: "Slot no longer available".to_string(),
            available_slots: None,
        }
    }

    /// Whether retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::CatalogUnavailable(_) | AppError::StoreUnavailable(_) | AppError::Database(_)
        )
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Messages per form field
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
    /// Start times still free for the requested barber and date ("HH:MM")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_slots: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retryable = self.is_retryable();
        let mut available_slots = None;

        let (status, code, message, errors) = match self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::BadValue,
                "Invalid booking request".to_string(),
                errors,
            ),
            AppError::NotFound(errors) => (
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                "Referenced entity not found".to_string(),
                errors,
            ),
            AppError::Conflict { message, available_slots: slots } => {
                available_slots = slots.map(|slots| {
                    slots.iter().map(|t| t.format("%H:%M").to_string()).collect()
                });
                (
                    StatusCode::CONFLICT,
                    ErrorCode::SlotUnavailable,
                    message,
                    IndexMap::from([("slot".to_string(), "no longer available".to_string())]),
                )
            }
            AppError::CatalogUnavailable(msg) => {
                tracing::warn!("Catalog unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::CatalogUnavailable,
                    "Service temporarily unavailable, please retry".to_string(),
                    FieldErrors::new(),
                )
            }
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Booking store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::StoreUnavailable,
                    "Service temporarily unavailable, please retry".to_string(),
                    FieldErrors::new(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::StoreUnavailable,
                    "Service temporarily unavailable, please retry".to_string(),
                    FieldErrors::new(),
                )
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg, FieldErrors::new())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                    FieldErrors::new(),
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            code: code as u32,
            error: format!("{:?}", code),
            message,
            errors,
            available_slots,
        });

        if retryable {
            (status, [(RETRY_AFTER, "1")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
