//! Error types for the graph client layer.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur while talking to the identity provider or the
/// document graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Caller input is malformed (e.g. an unparseable site URL).
    #[error("{0}")]
    Validation(String),

    /// The on-behalf-of exchange was denied or returned no access token.
    #[error("{0}")]
    AuthExchange(String),

    /// A resolved resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Non-2xx response from the document graph. Never retried.
    #[error("Graph {status}: {body}")]
    Remote { status: StatusCode, body: String },

    /// Rate limiting or unavailability persisted past the retry bound.
    #[error("Graph {status} persisted after {attempts} attempts")]
    Transient { status: StatusCode, attempts: u32 },

    /// Transport-level failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl GraphError {
    /// Whether the status is one the fetcher waits out and retries.
    pub fn is_transient_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
    }
}
