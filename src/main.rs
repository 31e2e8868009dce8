//! Copilot reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌───────────────────────────────────────────────────┐
//!                  │                  COPILOT PROXY                     │
//!                  │                                                    │
//!   POST /chat     │  ┌──────────┐   ┌───────────┐   ┌──────────────┐  │
//!   ───────────────┼─▶│   http   │──▶│  handlers │──▶│   upstream   │──┼──▶ https://127.0.0.1:8443
//!                  │  │  server  │   │  + body   │   │  forwarder   │  │    /copilot?chunked=true
//!                  │  └──────────┘   └───────────┘   └──────┬───────┘  │
//!                  │                                        │          │
//!   streamed body  │  ┌──────────┐                          │          │
//!   ◀──────────────┼──│ security │◀─────────────────────────┘          │
//!                  │  │ headers  │   status + headers copied,          │
//!                  │  └──────────┘   body relayed chunk by chunk       │
//!                  │                                                    │
//!                  │  config · observability · lifecycle                │
//!                  └───────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use copilot_proxy::config::resolve_config;
use copilot_proxy::http::HttpServer;
use copilot_proxy::lifecycle::{signals, Shutdown};
use copilot_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "copilot-proxy")]
#[command(about = "Streaming reverse proxy for the copilot service", long_about = None)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on; replaces the port in `listener.bind_address`.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = resolve_config(args.config.as_deref(), args.port)?;

    logging::init_logging(&config.observability);

    tracing::info!("copilot-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        insecure_skip_upstream_verify = config.upstream.insecure_skip_upstream_verify,
        connect_timeout_secs = config.timeouts.connect_secs,
        upstream_headers_timeout_secs = config.timeouts.upstream_headers_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Health check: http://{}/health", local_addr);
    tracing::info!(
        address = %local_addr,
        "Chat endpoint: http://{}/chat -> {}",
        local_addr,
        config.upstream.url
    );

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
