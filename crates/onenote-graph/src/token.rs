//! On-behalf-of token exchange against the identity provider.
//!
//! The inbound user credential is presented as a JWT-bearer assertion,
//! together with this service's client credentials, and exchanged for an
//! access token scoped to the document graph. Tokens are never cached.

use std::fmt;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{GraphError, GraphResult};

/// Grant type of the on-behalf-of flow.
pub const OBO_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Default scope requested for the document graph.
pub const DEFAULT_GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Default identity-provider authority host.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Bearer token for the document graph, owned by a single request.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value, for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// This service's identity at the identity provider.
#[derive(Clone)]
pub struct ClientCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Token endpoint response. Only the access token is used.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Performs the on-behalf-of exchange.
#[derive(Debug, Clone)]
pub struct OboExchanger {
    http: Client,
    authority_host: String,
    credentials: ClientCredentials,
    scope: String,
}

impl OboExchanger {
    /// Create an exchanger for the given authority host and downstream scope.
    pub fn new(
        http: Client,
        authority_host: impl Into<String>,
        credentials: ClientCredentials,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            http,
            authority_host: authority_host.into(),
            credentials,
            scope: scope.into(),
        }
    }

    /// Token endpoint of the configured tenant.
    pub fn token_endpoint(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.credentials.tenant_id
        )
    }

    /// Exchange `user_credential` for a document-graph access token.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::AuthExchange`] if the credential is empty, the
    /// endpoint cannot be reached, rejects the exchange, or responds without
    /// an access token. Never retried.
    pub async fn exchange(&self, user_credential: &str) -> GraphResult<AccessToken> {
        if user_credential.is_empty() {
            return Err(GraphError::AuthExchange(
                "missing user credential for on-behalf-of exchange".to_string(),
            ));
        }

        let params = [
            ("grant_type", OBO_GRANT_TYPE),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("assertion", user_credential),
            ("scope", self.scope.as_str()),
            ("requested_token_use", "on_behalf_of"),
        ];

        let resp = self
            .http
            .post(self.token_endpoint())
            .form(&params)
            .send()
            .await
            .map_err(|e| GraphError::AuthExchange(format!("token exchange request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<body unavailable: {e}>"));
            return Err(GraphError::AuthExchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let raw: TokenResponse = resp.json().await.map_err(|e| {
            GraphError::AuthExchange(format!("failed to parse token response: {e}"))
        })?;

        match raw.access_token {
            Some(token) if !token.is_empty() => {
                tracing::debug!(
                    tenant = %self.credentials.tenant_id,
                    "Exchanged user credential for graph token"
                );
                Ok(AccessToken(token))
            }
            _ => Err(GraphError::AuthExchange(
                "Failed to get Graph token via OBO".to_string(),
            )),
        }
    }
}
