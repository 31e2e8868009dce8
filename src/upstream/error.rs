//! Upstream failure types.

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

/// Failures that happen before upstream response headers arrive.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connect, TLS, or protocol failure while sending the request.
    #[error("{}", error_chain(.0))]
    Request(#[from] reqwest::Error),

    #[error("upstream sent no response headers within {} seconds", .0.as_secs())]
    HeaderTimeout(Duration),

    #[error("failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build upstream client: {}", error_chain(.0))]
    Client(#[source] reqwest::Error),
}

/// Render an error followed by each of its sources.
///
/// reqwest's own message only names the URL; the cause (for example
/// "Connection refused") lives further down the chain.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
