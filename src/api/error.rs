//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes. Upstream failures
//! keep their originating status where it is a meaningful HTTP code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::cubejs::CubeError;
use crate::tabular::TabularError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// No bearer token configured and none supplied by the caller
    #[error("Token JWT manquant")]
    MissingToken,

    /// Request validation failed (rejected before any outbound call)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream call failed; status mirrors the upstream response
    #[error("{detail}")]
    Upstream { status: u16, detail: String },

    /// Upstream call exceeded its timeout
    #[error("Upstream request timed out")]
    Timeout,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CubeError> for ApiError {
    fn from(e: CubeError) -> Self {
        match e {
            CubeError::Timeout => ApiError::Timeout,
            CubeError::Upstream { status, body } => ApiError::Upstream {
                status,
                detail: body,
            },
            CubeError::Request(e) => ApiError::Upstream {
                status: 502,
                detail: e.to_string(),
            },
            CubeError::Serialize(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<TabularError> for ApiError {
    fn from(e: TabularError) -> Self {
        match e {
            TabularError::Timeout => ApiError::Timeout,
            TabularError::Upstream { status, message } => ApiError::Upstream {
                status,
                detail: message,
            },
            TabularError::Request(e) => ApiError::Upstream {
                status: 502,
                detail: e.to_string(),
            },
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::MissingToken => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Upstream { status, .. } => {
                let code = if *status == 404 {
                    "NOT_FOUND"
                } else {
                    "UPSTREAM_ERROR"
                };
                (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                    code,
                )
            }
            ApiError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
