//! Copilot reverse proxy library.
//!
//! Accepts JSON chat requests on `/chat` and `/copilot`, forwards them to a
//! single upstream, and streams the upstream response back unchanged.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
