//! Resilient fetcher integration tests using wiremock
//!
//! Verifies `src/fetch.rs` against a mock document graph:
//!
//! - Bearer token and JSON content type are injected.
//! - JSON and text bodies are decoded by content type.
//! - 429/503 are waited out (Retry-After or the fixed default) and retried.
//! - Other non-2xx statuses fail immediately with status and body.
//! - An optional attempt bound surfaces a transient error.

mod common;

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use onenote_graph::{AccessToken, FetchBody, FetchOptions, Fetcher, GraphError, RetryPolicy};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fetcher(policy: RetryPolicy) -> Fetcher {
    Fetcher::new(reqwest::Client::new(), policy)
}

fn token() -> AccessToken {
    AccessToken::new("graph-token")
}

// ---------------------------------------------------------------------------
// Header injection and decoding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_injects_bearer_and_decodes_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me"))
        .and(header("authorization", "Bearer graph-token"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "me-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let body = fetcher(RetryPolicy::default())
        .fetch(&format!("{}/v1.0/me", server.uri()), &token(), FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(body, FetchBody::Structured(serde_json::json!({"id": "me-1"})));
}

#[tokio::test]
async fn test_non_json_content_type_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/page/content"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>hi</html>", "text/html"))
        .mount(&server)
        .await;

    let body = fetcher(RetryPolicy::default())
        .fetch(
            &format!("{}/v1.0/page/content", server.uri()),
            &token(),
            FetchOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(body, FetchBody::Text("<html>hi</html>".to_string()));
}

#[tokio::test]
async fn test_caller_may_override_content_type_but_not_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/echo"))
        .and(header("authorization", "Bearer graph-token"))
        .and(header("content-type", "application/merge-patch+json"))
        .and(body_json(serde_json::json!({"name": "x"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/merge-patch+json"),
    );
    headers.insert("authorization", HeaderValue::from_static("Bearer other"));

    let options = FetchOptions {
        method: Method::POST,
        body: Some(serde_json::json!({"name": "x"})),
        headers,
    };

    let body = fetcher(RetryPolicy::default())
        .fetch(&format!("{}/v1.0/echo", server.uri()), &token(), options)
        .await
        .unwrap();

    assert_eq!(body, FetchBody::Text(String::new()));
}

#[tokio::test]
async fn test_empty_token_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = fetcher(RetryPolicy::default())
        .fetch(&server.uri(), &AccessToken::new(""), FetchOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GraphError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_other_error_status_fails_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/onenote/notebooks"))
        .respond_with(ResponseTemplate::new(404).set_body_string("itemNotFound"))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(RetryPolicy::default())
        .fetch(
            &format!("{}/v1.0/me/onenote/notebooks", server.uri()),
            &token(),
            FetchOptions::default(),
        )
        .await
        .unwrap_err();

    match err {
        GraphError::Remote { status, body } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, "itemNotFound");
        }
        other => panic!("expected Remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_retry_after_is_honored_before_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "me-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let started = Instant::now();
    let body = fetcher(RetryPolicy::default())
        .fetch(&format!("{}/v1.0/me", server.uri()), &token(), FetchOptions::default())
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(1000));
    assert_eq!(body, FetchBody::Structured(serde_json::json!({"id": "me-1"})));
}

#[tokio::test]
async fn test_service_unavailable_uses_default_delay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let started = Instant::now();
    let body = fetcher(RetryPolicy::with_default_delay(Duration::from_millis(50)))
        .fetch(&server.uri(), &token(), FetchOptions::default())
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(body, FetchBody::Text("ok".to_string()));
}

#[tokio::test]
async fn test_bounded_policy_surfaces_transient_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let err = fetcher(RetryPolicy::default().bounded(3))
        .fetch(&server.uri(), &token(), FetchOptions::default())
        .await
        .unwrap_err();

    match err {
        GraphError::Transient { status, attempts } => {
            assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
            assert_eq!(attempts, 3);
        }
        other => panic!("expected Transient error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unbounded_policy_needs_an_outer_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = fetcher(RetryPolicy::with_default_delay(Duration::from_millis(20)));
    let result = tokio::time::timeout(
        Duration::from_millis(300),
        fetcher.fetch(&server.uri(), &token(), FetchOptions::default()),
    )
    .await;

    tokio_test::assert_err!(result, "unbounded retry loop should only end by timeout");
    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() > 1);
}

#[tokio::test]
async fn test_unreadable_error_body_is_reported() {
    let base = common::serve_truncated_body("502 Bad Gateway").await;

    let err = fetcher(RetryPolicy::default())
        .fetch(&base, &token(), FetchOptions::default())
        .await
        .unwrap_err();

    match err {
        GraphError::Remote { status, body } => {
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert!(body.starts_with("<body unavailable:"), "{body}");
        }
        other => panic!("expected Remote error, got {other:?}"),
    }
}
