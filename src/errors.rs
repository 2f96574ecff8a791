use axum::{http::StatusCode, Json};
use serde_json::json;
use thiserror::Error;

/// Rejected input to the tracker core. Absence (no entry, no label match)
/// is never one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: String, end: String },

    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("amount for '{0}' must not be negative")]
    NegativeAmount(String),

    #[error("amount for '{0}' must be a finite number")]
    NonFiniteAmount(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("duplicate category '{0}'")]
    DuplicateCategory(String),

    #[error("milestone at minute {0} is not after the previous one")]
    ScheduleNotAscending(u32),

    #[error("milestone fraction {0} must lie in (0, 1]")]
    InvalidFraction(f64),

    #[error("utc offset of {0} minutes is out of range")]
    InvalidOffset(i32),

    #[error("parameter labels must not be blank")]
    EmptyLabel,

    #[error("missing field '{0}'")]
    MissingField(&'static str),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
