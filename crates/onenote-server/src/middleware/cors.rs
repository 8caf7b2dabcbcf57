//! CORS policy built from `CORS_ALLOWED_ORIGINS`.

use http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer. `*` allows any origin; otherwise the value is a
/// comma-separated origin list and unparseable entries are skipped.
pub fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(parse_origins(allowed_origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn parse_origins(allowed_origins: &str) -> Vec<HeaderValue> {
    allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match HeaderValue::from_str(s) {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = s, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}
