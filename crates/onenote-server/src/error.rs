//! API error types with JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use onenote_graph::GraphError;
use serde::Serialize;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Server-side configuration is incomplete (500).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Bad request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unauthorized (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Identity provider or document graph error.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Graph(e) => match e {
                GraphError::Validation(_) => "VALIDATION_ERROR",
                GraphError::AuthExchange(_) => "AUTH_EXCHANGE_ERROR",
                GraphError::NotFound(_) => "NOT_FOUND",
                GraphError::Remote { .. } => "REMOTE_ERROR",
                GraphError::Transient { .. } => "TRANSIENT_ERROR",
                GraphError::Request(_) | GraphError::Decode(_) => "INTERNAL_ERROR",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Graph(e) => match e {
                GraphError::Validation(_) => StatusCode::BAD_REQUEST,
                GraphError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message returned to the caller, without the log prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Configuration(m)
            | Self::BadRequest(m)
            | Self::Unauthorized(m) => m.clone(),
            Self::Graph(e) => {
                let message = e.to_string();
                if message.is_empty() {
                    "Unknown error".to_string()
                } else {
                    message
                }
            }
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
