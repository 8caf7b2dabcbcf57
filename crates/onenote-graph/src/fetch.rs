//! Resilient fetch primitive for the document graph.
//!
//! Every call carries `Authorization: Bearer <token>` and a JSON
//! content type. Rate limiting (429) and unavailability (503) are waited
//! out and retried; every other non-2xx status fails immediately.
//! Successful bodies are decoded according to the response content type.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{GraphError, GraphResult};
use crate::token::AccessToken;

/// Wait used when the server does not say how long to back off.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);

// ============================================================================
// Retry Policy
// ============================================================================

/// How the fetcher waits out 429/503 responses.
///
/// The delay is fixed (no growth). With `max_attempts = None` retries
/// continue until the caller's own timeout cancels the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait applied when no usable `Retry-After` header is present.
    pub default_delay: Duration,
    /// Upper bound on total attempts, including the first one.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            default_delay: DEFAULT_RETRY_DELAY,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Unbounded policy with a custom fallback delay.
    #[must_use]
    pub fn with_default_delay(default_delay: Duration) -> Self {
        Self {
            default_delay,
            ..Self::default()
        }
    }

    /// Returns a copy of this policy capped at `max_attempts` total attempts.
    #[must_use]
    pub fn bounded(self, max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            ..self
        }
    }

    /// Whether another attempt may follow `attempts` completed ones.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts < max)
    }

    /// Wait before the next attempt, honoring a `Retry-After` value given
    /// in seconds.
    pub fn delay_for(&self, retry_after: Option<&HeaderValue>) -> Duration {
        retry_after
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after)
            .unwrap_or(self.default_delay)
    }
}

/// Parse a `Retry-After` value expressed as (possibly fractional) seconds.
///
/// HTTP-date values, negatives and non-finite numbers are rejected.
fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

// ============================================================================
// Request / Response Types
// ============================================================================

/// Per-call request options.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// HTTP method, `GET` by default.
    pub method: Method,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Extra headers. May override the content type; an `Authorization`
    /// header here is ignored.
    pub headers: HeaderMap,
}

/// Decoded success payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchBody {
    /// The response declared a JSON content type.
    Structured(Value),
    /// Any other content type, returned verbatim.
    Text(String),
}

impl FetchBody {
    /// Deserialize a structured body into `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> GraphResult<T> {
        match self {
            Self::Structured(value) => serde_json::from_value(value)
                .map_err(|e| GraphError::Decode(format!("unexpected JSON shape: {e}"))),
            Self::Text(_) => Err(GraphError::Decode(
                "expected a JSON response, got text".to_string(),
            )),
        }
    }
}

// ============================================================================
// Fetcher
// ============================================================================

/// Bearer-authenticated HTTP client with rate-limit retry.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    /// Create a fetcher over an existing HTTP client.
    pub fn new(http: Client, retry: RetryPolicy) -> Self {
        Self { http, retry }
    }

    /// Get the retry policy in effect.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Perform a request against `url` on behalf of `token`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::Validation`] if `token` is empty (no request is sent)
    /// - [`GraphError::Remote`] for any non-2xx status other than 429/503
    /// - [`GraphError::Transient`] once the retry bound, if any, is exhausted
    /// - [`GraphError::Request`] / [`GraphError::Decode`] for transport or
    ///   body failures
    pub async fn fetch(
        &self,
        url: &str,
        token: &AccessToken,
        options: FetchOptions,
    ) -> GraphResult<FetchBody> {
        if token.secret().is_empty() {
            return Err(GraphError::Validation(
                "missing bearer token for graph request".to_string(),
            ));
        }

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let response = self.send(url, token, &options).await?;
            let status = response.status();

            if GraphError::is_transient_status(status) {
                if !self.retry.allows_retry(attempts) {
                    return Err(GraphError::Transient { status, attempts });
                }
                let delay = self.retry.delay_for(response.headers().get(RETRY_AFTER));
                drop(response);
                tokio::time::sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|e| format!("<body unavailable: {e}>"));
                return Err(GraphError::Remote { status, body });
            }

            return decode(response).await;
        }
    }

    /// GET `url` and deserialize the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &AccessToken,
    ) -> GraphResult<T> {
        self.fetch(url, token, FetchOptions::default())
            .await?
            .into_json()
    }

    async fn send(
        &self,
        url: &str,
        token: &AccessToken,
        options: &FetchOptions,
    ) -> GraphResult<Response> {
        let mut headers = options.headers.clone();
        headers.remove(AUTHORIZATION);
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut request = self
            .http
            .request(options.method.clone(), url)
            .headers(headers)
            .bearer_auth(token.secret());

        if let Some(body) = &options.body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }
}

/// Decode a success response by its declared content type.
async fn decode(response: Response) -> GraphResult<FetchBody> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));

    let text = response.text().await?;
    if !is_json {
        return Ok(FetchBody::Text(text));
    }
    if text.trim().is_empty() {
        return Ok(FetchBody::Structured(Value::Null));
    }

    serde_json::from_str(&text)
        .map(FetchBody::Structured)
        .map_err(|e| GraphError::Decode(format!("invalid JSON body: {e}")))
}

// ============================================================================
// Tests
// ============================================================================
