//! Server configuration from environment variables.

use std::env;
use std::time::Duration;

use onenote_graph::ClientCredentials;
use onenote_graph::RetryPolicy;
use onenote_graph::resolver::DEFAULT_GRAPH_BASE_URL;
use onenote_graph::token::{DEFAULT_AUTHORITY_HOST, DEFAULT_GRAPH_SCOPE};

/// Identity-provider settings for the on-behalf-of exchange.
///
/// Values are optional at load time: a missing value fails each request
/// with a 500 instead of preventing startup.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct IdentityConfig {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl IdentityConfig {
    /// Complete credentials, or the names of the missing variables.
    pub fn credentials(&self) -> Result<ClientCredentials, ConfigError> {
        match (&self.tenant_id, &self.client_id, &self.client_secret) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => Ok(ClientCredentials {
                tenant_id: tenant_id.clone(),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => {
                let missing: Vec<&str> = [
                    ("TENANT_ID", &self.tenant_id),
                    ("CLIENT_ID", &self.client_id),
                    ("CLIENT_SECRET", &self.client_secret),
                ]
                .into_iter()
                .filter(|(_, value)| value.is_none())
                .map(|(name, _)| name)
                .collect();
                Err(ConfigError::MissingEnvVar(missing.join(", ")))
            }
        }
    }
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Identity-provider tenant and client.
    pub identity: IdentityConfig,
    /// Identity-provider authority host.
    pub authority_host: String,
    /// Document-graph base URL including the API version.
    pub graph_base_url: String,
    /// Scope requested in the on-behalf-of exchange.
    pub graph_scope: String,
    /// Retry behavior for rate-limited graph calls.
    pub retry: RetryPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Identity (checked per request):
    /// - `TENANT_ID`, `CLIENT_ID`, `CLIENT_SECRET`
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 3000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `AUTHORITY_HOST`: Identity provider (default: `https://login.microsoftonline.com`)
    /// - `GRAPH_BASE_URL`: Document graph (default: `https://graph.microsoft.com/v1.0`)
    /// - `GRAPH_SCOPE`: Exchanged scope (default: `https://graph.microsoft.com/.default`)
    /// - `GRAPH_RETRY_DELAY_MS`: Wait when no Retry-After is sent (default: 2000)
    /// - `GRAPH_MAX_ATTEMPTS`: Cap on attempts for 429/503 (default: unbounded)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let port = parse_var::<u16>(&var, "PORT")?.unwrap_or(3000);
        let log_level = var("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string());

        let identity = IdentityConfig {
            tenant_id: var("TENANT_ID"),
            client_id: var("CLIENT_ID"),
            client_secret: var("CLIENT_SECRET"),
        };

        let authority_host =
            var("AUTHORITY_HOST").unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string());
        let graph_base_url =
            var("GRAPH_BASE_URL").unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string());
        let graph_scope = var("GRAPH_SCOPE").unwrap_or_else(|| DEFAULT_GRAPH_SCOPE.to_string());

        let mut retry = RetryPolicy::default();
        if let Some(ms) = parse_var::<u64>(&var, "GRAPH_RETRY_DELAY_MS")? {
            retry.default_delay = Duration::from_millis(ms);
        }
        if let Some(max) = parse_var::<u32>(&var, "GRAPH_MAX_ATTEMPTS")? {
            if max == 0 {
                return Err(ConfigError::InvalidValue {
                    name: "GRAPH_MAX_ATTEMPTS".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            retry = retry.bounded(max);
        }

        Ok(Self {
            port,
            log_level,
            cors_allowed_origins,
            identity,
            authority_host,
            graph_base_url,
            graph_scope,
            retry,
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|raw| {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                name: name.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = load(&[]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cors_allowed_origins, "*");
        assert_eq!(config.authority_host, "https://login.microsoftonline.com");
        assert_eq!(config.graph_base_url, "https://graph.microsoft.com/v1.0");
        assert_eq!(config.graph_scope, "https://graph.microsoft.com/.default");
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.identity, IdentityConfig::default());
    }

    #[test]
    fn test_identity_complete() {
        let config = load(&[
            ("TENANT_ID", "t"),
            ("CLIENT_ID", "c"),
            ("CLIENT_SECRET", "s"),
        ])
        .unwrap();
        let creds = config.identity.credentials().unwrap();
        assert_eq!(creds.tenant_id, "t");
        assert_eq!(creds.client_id, "c");
        assert_eq!(creds.client_secret, "s");
    }

    #[test]
    fn test_identity_missing_any_value() {
        let combos: [&[(&str, &str)]; 4] = [
            &[("CLIENT_ID", "c"), ("CLIENT_SECRET", "s")],
            &[("TENANT_ID", "t"), ("CLIENT_SECRET", "s")],
            &[("TENANT_ID", "t"), ("CLIENT_ID", "c")],
            &[("TENANT_ID", "t"), ("CLIENT_ID", ""), ("CLIENT_SECRET", "s")],
        ];
        for vars in combos {
            let config = load(vars).unwrap();
            assert!(config.identity.credentials().is_err(), "{vars:?}");
        }
    }

    #[test]
    fn test_identity_error_names_missing_variables() {
        let config = load(&[("CLIENT_ID", "c")]).unwrap();
        let err = config.identity.credentials().unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing required environment variable: TENANT_ID, CLIENT_SECRET"
        );
    }

    #[test]
    fn test_retry_settings() {
        let config = load(&[("GRAPH_RETRY_DELAY_MS", "250"), ("GRAPH_MAX_ATTEMPTS", "5")]).unwrap();
        assert_eq!(config.retry.default_delay, Duration::from_millis(250));
        assert_eq!(config.retry.max_attempts, Some(5));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            load(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            load(&[("GRAPH_MAX_ATTEMPTS", "0")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_secret_not_in_debug_output() {
        let config = load(&[("CLIENT_SECRET", "hunter2")]).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
