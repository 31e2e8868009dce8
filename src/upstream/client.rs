//! Upstream HTTP client construction.

use std::time::Duration;

use reqwest::redirect::Policy;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::upstream::error::UpstreamError;

/// Build the client used for every upstream call.
///
/// Redirects are returned to the caller untouched and environment proxy
/// variables are ignored: the upstream is always dialled directly.
pub fn build_client(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<reqwest::Client, UpstreamError> {
    if upstream.insecure_skip_upstream_verify {
        tracing::warn!(
            upstream = %upstream.url,
            "Upstream certificate verification is disabled (insecure_skip_upstream_verify = true)"
        );
    }

    let mut builder = reqwest::Client::builder()
        .danger_accept_invalid_certs(upstream.insecure_skip_upstream_verify)
        .pool_max_idle_per_host(upstream.pool_max_idle_per_host)
        .redirect(Policy::none())
        .no_proxy();

    if timeouts.connect_secs > 0 {
        builder = builder.connect_timeout(Duration::from_secs(timeouts.connect_secs));
    }

    builder.build().map_err(UpstreamError::Client)
}
