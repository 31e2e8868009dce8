//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, body limit, request ID, security headers,
//!   CORS, panic recovery)
//! - Serve static files for unmatched GET requests
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::ProxyConfig;
use crate::http::handlers;
use crate::http::request::{request_id, request_id_layer};
use crate::http::response::handle_panic;
use crate::lifecycle::shutdown;
use crate::security;
use crate::upstream::{Forwarder, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the copilot proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, UpstreamError> {
        let forwarder = Arc::new(Forwarder::new(&config)?);
        let state = AppState { forwarder };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let static_files = ServeDir::new(&config.static_dir)
            .call_fallback_on_method_not_allowed(true)
            .fallback(handlers::not_found.into_service());

        let router = Router::new()
            .route("/health", get(handlers::health).fallback(handlers::not_found))
            .route("/chat", post(handlers::chat).fallback(handlers::not_found))
            .route("/copilot", post(handlers::chat).fallback(handlers::not_found))
            .fallback_service(static_files)
            .with_state(state);

        Self::apply_layers(router, config)
    }

    /// Wrap `router` in the middleware stack, innermost first.
    fn apply_layers(router: Router, config: &ProxyConfig) -> Router {
        let router = router
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(CatchPanicLayer::custom(handle_panic));

        let router = if config.security.enable_cors {
            router.layer(security::cors_layer())
        } else {
            router
        };

        let router = if config.security.enable_headers {
            security::apply_security_headers(router)
        } else {
            router
        };

        router
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id(request),
                        )
                    })
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(request_id_layer())
    }

    /// Run the server, accepting connections on the given listener, until
    /// `shutdown_rx` fires. In-flight responses are drained before returning.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::signalled(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}
