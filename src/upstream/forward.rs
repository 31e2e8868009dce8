//! Forwarding a chat body to the upstream and relaying its response.

use std::time::Duration;

use axum::{
    body::Body,
    http::{
        header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE},
        Response,
    },
};
use futures_util::TryStreamExt;
use reqwest::Url;
use serde_json::Value;

use crate::config::ProxyConfig;
use crate::upstream::client::build_client;
use crate::upstream::error::UpstreamError;
use crate::upstream::headers::forwarded_headers;

/// Sends chat bodies to the configured upstream.
///
/// Holds no per-request state; one instance is shared by all handlers.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    url: Url,
    header_timeout: Option<Duration>,
}

impl Forwarder {
    /// Create a forwarder for `config.upstream`.
    pub fn new(config: &ProxyConfig) -> Result<Self, UpstreamError> {
        let url = Url::parse(&config.upstream.url)?;
        let client = build_client(&config.upstream, &config.timeouts)?;
        let header_timeout = match config.timeouts.upstream_headers_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            client,
            url,
            header_timeout,
        })
    }

    /// POST `body` upstream and return a response mirroring the upstream's.
    ///
    /// Resolves once upstream headers are in; the returned body streams the
    /// rest. Any error here means nothing has been sent to the caller yet.
    pub async fn forward(&self, inbound: &HeaderMap, body: &Value) -> Result<Response<Body>, UpstreamError> {
        let payload = serde_json::to_vec(body)?;

        let mut headers = forwarded_headers(inbound);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(payload.len()));

        let send = self
            .client
            .post(self.url.clone())
            .headers(headers)
            .body(payload)
            .send();

        let upstream = match self.header_timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| UpstreamError::HeaderTimeout(limit))??,
            None => send.await?,
        };

        tracing::debug!(
            status = %upstream.status(),
            headers = upstream.headers().len(),
            "Upstream responded"
        );

        Ok(relay(upstream))
    }
}

/// Turn the upstream response into ours: same status, same headers, and a
/// body that yields upstream chunks as they are read.
fn relay(upstream: reqwest::Response) -> Response<Body> {
    let status = upstream.status();
    let headers = upstream.headers().clone();

    let stream = upstream.bytes_stream().inspect_err(|e| {
        tracing::warn!(error = %e, "Upstream body stream interrupted");
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
