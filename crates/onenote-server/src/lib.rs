//! onenote-server: HTTP handler listing the sections of a OneNote notebook
//!
//! This crate provides:
//! - `POST /api/list-sections`: exchanges the caller's bearer token
//!   on-behalf-of, resolves the requested notebook and returns its sections
//! - `GET /health` liveness check reporting identity configuration
//! - Request id propagation and JSON error responses
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//!
//! # Usage
//!
//! ```rust,ignore
//! use onenote_server::{config::ServerConfig, routes, state::AppState};
//!
//! let config = ServerConfig::from_env()?;
//! let app = routes::build_app(AppState::new(config)?);
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use config::{ConfigError, IdentityConfig, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use onenote_core;
pub use onenote_graph;
