//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! parsed JSON body + inbound headers
//!     → headers.rs (copy the whitelisted request headers)
//!     → forward.rs (serialize, POST to the upstream, await headers)
//!     → response with upstream status + headers, body streamed chunk by chunk
//!
//! failure before upstream headers
//!     → error.rs (UpstreamError) → 500 JSON in http::response
//! ```
//!
//! # Design Decisions
//! - Exactly one upstream, fixed at startup
//! - No retries: one connection attempt per inbound request
//! - The body stream is pull-driven, so the upstream is read only as fast as
//!   the caller consumes
//! - Dropping the response (client gone) drops the upstream connection

pub mod client;
pub mod error;
pub mod forward;
pub mod headers;

pub use error::UpstreamError;
pub use forward::Forwarder;
pub use headers::FORWARDED_REQUEST_HEADERS;
