//! Cross-origin policy.

use axum::http::Method;
use tower_http::cors::{AllowHeaders, Any, CorsLayer};

/// Allow any origin, the common methods, and whatever headers a preflight asks for.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}
