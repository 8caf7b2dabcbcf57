//! onenote-graph: Client layer for the document-graph API
//!
//! This crate provides:
//! - A resilient fetch primitive (bearer injection, content negotiation,
//!   retry on rate limiting)
//! - On-behalf-of token exchange against the identity provider
//! - Resolution of a site URL and notebook name into the notebook's sections
//!
//! # Usage
//!
//! ```rust,ignore
//! use onenote_graph::{ClientCredentials, Fetcher, OboExchanger, Resolver, RetryPolicy};
//!
//! let http = reqwest::Client::new();
//! let exchanger = OboExchanger::new(http.clone(), authority_host, credentials, graph_scope);
//! let token = exchanger.exchange(user_jwt).await?;
//!
//! let resolver = Resolver::new(Fetcher::new(http, RetryPolicy::default()), graph_base);
//! let sections = resolver.resolve(site_url, "Sales", &token).await?;
//! ```

pub mod error;
pub mod fetch;
pub mod resolver;
pub mod token;

pub use error::{GraphError, GraphResult};
pub use fetch::{FetchBody, FetchOptions, Fetcher, RetryPolicy};
pub use resolver::Resolver;
pub use token::{AccessToken, ClientCredentials, OboExchanger};

// Re-export onenote-core for downstream crates
pub use onenote_core;
