//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → headers.rs (add CSP and hardening headers when absent)
//!     → cors.rs (add Access-Control-* headers, answer preflights)
//!     → Send to client
//! ```
//!
//! Upstream credentials are never inspected: the `Authorization` header is
//! passed through as-is by the upstream module.

pub mod cors;
pub mod headers;

pub use cors::cors_layer;
pub use headers::apply_security_headers;
