//! Application state shared across handlers.

use std::sync::Arc;

use onenote_graph::{ClientCredentials, Fetcher, OboExchanger, Resolver};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// Holds only immutable configuration and the HTTP client handle. Tokens
/// and lookup results are never stored here.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// Outbound HTTP client (idle pooling disabled).
    http: reqwest::Client,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ServerConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build a token exchanger for the given client credentials.
    pub fn exchanger(&self, credentials: ClientCredentials) -> OboExchanger {
        OboExchanger::new(
            self.http.clone(),
            self.config.authority_host.clone(),
            credentials,
            self.config.graph_scope.clone(),
        )
    }

    /// Build a resolver over the configured document graph.
    pub fn resolver(&self) -> Resolver {
        Resolver::new(
            Fetcher::new(self.http.clone(), self.config.retry),
            self.config.graph_base_url.clone(),
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
