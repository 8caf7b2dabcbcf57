//! Route definitions for the HTTP API.

pub mod health;
pub mod sections;

use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_layer;
use crate::middleware::request_id::{propagate_request_id, request_id_layer};
use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(sections::routes())
        .with_state(state)
}

/// Build the served application: the router wrapped in request id, CORS
/// and HTTP tracing layers.
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_allowed_origins);

    build_router(state)
        .layer(middleware::from_fn(propagate_request_id))
        .layer(request_id_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
