//! Section listing route.
//!
//! - POST /api/list-sections - List the sections of a notebook on behalf of
//!   the caller
//!
//! The handler checks, in order: identity-provider configuration, the
//! caller's bearer credential, the request body. Only then does it exchange
//! the credential on-behalf-of and resolve the notebook.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
    routing::post,
};
use serde::Deserialize;

use onenote_core::SectionSummary;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Body of the 500 returned when identity settings are incomplete.
pub const CONFIG_MISSING: &str = "Server configuration missing required environment variables.";

/// Body of the 401 returned without a usable bearer credential.
pub const MISSING_TOKEN: &str = "Missing user bearer token";

/// Body of the 400 returned without a notebook name.
pub const NOTEBOOK_NAME_REQUIRED: &str = "notebookName required";

// ============================================================================
// Request Types
// ============================================================================

/// Request body for POST /api/list-sections.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSectionsRequest {
    /// Site whose notebooks to search; the caller's own notebooks if absent.
    #[serde(default)]
    pub site_url: Option<String>,
    /// Display name of the notebook.
    #[serde(default)]
    pub notebook_name: Option<String>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Extract the caller's credential from the `Authorization` header.
///
/// A leading `Bearer` scheme is stripped case-insensitively; a value
/// without it is used as-is.
fn bearer_credential(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();

    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim_start(),
        None if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };

    (!token.is_empty()).then_some(token)
}

/// Decode the request body. Empty or undecodable bodies count as `{}`.
fn parse_request(body: &[u8]) -> ListSectionsRequest {
    if body.is_empty() {
        return ListSectionsRequest::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Ignoring undecodable request body");
        ListSectionsRequest::default()
    })
}

async fn run(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> ApiResult<Vec<SectionSummary>> {
    let credentials = state.config().identity.credentials().map_err(|e| {
        tracing::error!(error = %e, "Identity provider configuration incomplete");
        ApiError::Configuration(CONFIG_MISSING.to_string())
    })?;

    let user_credential = bearer_credential(headers)
        .ok_or_else(|| ApiError::Unauthorized(MISSING_TOKEN.to_string()))?;

    let request = parse_request(body);
    let notebook_name = request
        .notebook_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(NOTEBOOK_NAME_REQUIRED.to_string()))?;

    let token = state.exchanger(credentials).exchange(user_credential).await?;

    let sections = state
        .resolver()
        .resolve(request.site_url.as_deref(), notebook_name, &token)
        .await?;

    Ok(sections)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/list-sections - List the sections of a notebook.
///
/// # Request
///
/// `Authorization: Bearer <user token>`, body `{ "siteUrl"?, "notebookName" }`.
///
/// # Response
///
/// - 200 OK: `[{ sectionId, sectionName, notebookId, notebookName }, ...]`
/// - 400 Bad Request: missing notebook name or malformed site URL
/// - 401 Unauthorized: missing bearer credential
/// - 404 Not Found: no notebook with that name
/// - 500 Internal Server Error: configuration, exchange or remote failure
async fn list_sections(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Vec<SectionSummary>>> {
    let sections = run(&state, &headers, &body).await.inspect_err(|e| {
        let status = e.status_code().as_u16();
        if e.status_code().is_server_error() {
            tracing::error!(code = e.code(), status, error = %e, "list-sections error");
        } else {
            tracing::warn!(code = e.code(), status, error = %e, "list-sections error");
        }
    })?;

    tracing::info!(count = sections.len(), "Listed notebook sections");
    Ok(Json(sections))
}

/// Build section routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/list-sections", post(list_sections))
}

// ============================================================================
// Tests
// ============================================================================
