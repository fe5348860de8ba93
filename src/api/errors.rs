//! API error types and HTTP status mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::scheduler::SchedulerError;
use crate::storage::StoreError;

/// API error response body. `parameter` carries field-level detail for
/// validation failures (true marks a missing field).
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<HashMap<&'static str, bool>>,
}

/// API error type that can be converted to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed request parameters.
    Validation {
        message: String,
        parameters: Option<HashMap<&'static str, bool>>,
    },
    /// Referenced program does not exist.
    NotFound(String),
    /// A program with the same start time already exists.
    DuplicateStart,
    /// Internal server error, including scheduler invariant violations.
    Internal(String),
}

impl ApiError {
    /// Validation failure with just a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            parameters: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, parameter) = match self {
            ApiError::Validation {
                message,
                parameters,
            } => (StatusCode::BAD_REQUEST, message, parameters),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::DuplicateStart => (
                StatusCode::BAD_REQUEST,
                "Start times must be unique".to_string(),
                None,
            ),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal API error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None)
            }
        };

        (status, Json(ErrorResponse { message, parameter })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::DuplicateStart(_) => ApiError::DuplicateStart,
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<SchedulerError> for ApiError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::Store(e) => e.into(),
            // A scheduling conflict surfacing through the API is a logic
            // bug; report it as a server error.
            other => ApiError::Internal(other.to_string()),
        }
    }
}
