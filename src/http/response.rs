//! Response handling.
//!
//! # Responsibilities
//! - Map handler failures to the JSON error payloads callers expect
//! - Build the 404 discoverability payload
//! - Convert panics caught by `CatchPanicLayer` into a 500 payload
//!
//! # Design Decisions
//! - Upstream responses are never rewritten; only locally produced
//!   responses go through this module
//! - Every error body is `{"error": ..., "message": ...}`

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::upstream::UpstreamError;

pub const UPSTREAM_FAILURE: &str = "Failed to connect to copilot service";
pub const INTERNAL_FAILURE: &str = "Internal server error";
pub const NOT_FOUND: &str = "Endpoint not found";

/// Errors a handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// The upstream failed before sending response headers.
    Upstream(UpstreamError),
    /// Anything else that went wrong while handling the request.
    Internal(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Upstream(e) => write!(f, "{}: {}", UPSTREAM_FAILURE, e),
            ApiError::Internal(message) => write!(f, "{}: {}", INTERNAL_FAILURE, message),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<UpstreamError> for ApiError {
    fn from(e: UpstreamError) -> Self {
        ApiError::Upstream(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (error, message) = match self {
            ApiError::Upstream(e) => (UPSTREAM_FAILURE, e.to_string()),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Unhandled error");
                (INTERNAL_FAILURE, message)
            }
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": error, "message": message })),
        )
            .into_response()
    }
}

/// 404 body listing the endpoints callers can use.
pub fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": NOT_FOUND,
            "availableEndpoints": {
                "GET /health": "Health check",
                "POST /chat": "Send a chat message (proxies to copilot service)"
            }
        })),
    )
        .into_response()
}

/// Response used by `CatchPanicLayer` when a handler panics.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    ApiError::Internal(message).into_response()
}
