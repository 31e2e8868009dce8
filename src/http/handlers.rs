//! Route handlers.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, State},
    http::HeaderMap,
    response::Response,
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::http::request::ChatBody;
use crate::http::response::{self, ApiError};
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
}

/// Current UTC time as ISO-8601 with millisecond precision.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `GET /health`. Never touches the upstream.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "OK",
        timestamp: iso_timestamp(),
    })
}

/// `POST /chat` and `POST /copilot`.
pub async fn chat(
    State(state): State<AppState>,
    matched: MatchedPath,
    headers: HeaderMap,
    ChatBody(body): ChatBody,
) -> Result<Response, ApiError> {
    let start = Instant::now();
    let route = matched.as_str().to_string();

    tracing::info!(
        route = %route,
        body = %body,
        timestamp = %iso_timestamp(),
        "Proxying request to copilot"
    );

    match state.forwarder.forward(&headers, &body).await {
        Ok(response) => {
            metrics::record_request(&route, response.status().as_u16(), start);
            Ok(response)
        }
        Err(e) => {
            tracing::error!(route = %route, error = %e, "Error proxying to copilot");
            metrics::record_request(&route, 500, start);
            metrics::record_upstream_error();
            Err(ApiError::Upstream(e))
        }
    }
}

/// Anything no route or static file answered.
pub async fn not_found() -> Response {
    response::not_found()
}
