//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, body → JSON value)
//!     → handlers.rs (/health, /chat, /copilot, 404)
//!     → upstream::Forwarder (POST upstream, stream back)
//!     → response.rs (JSON error payloads for local failures)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{ChatBody, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
