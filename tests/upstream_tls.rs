//! HTTPS upstreams with a self-signed certificate.

use std::net::SocketAddr;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use serde_json::{json, Value};

mod common;

/// Start an HTTPS upstream whose certificate no root store trusts.
async fn start_self_signed_upstream() -> SocketAddr {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string(), "127.0.0.1".to_string()]).unwrap();
    let tls = RustlsConfig::from_pem(cert.pem().into_bytes(), key_pair.serialize_pem().into_bytes())
        .await
        .unwrap();

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(|| async { "secure hello" });
    tokio::spawn(async move {
        let _ = axum_server::from_tcp_rustls(listener, tls)
            .serve(app.into_make_service())
            .await;
    });
    addr
}

fn https_config(upstream: SocketAddr, skip_verify: bool) -> copilot_proxy::ProxyConfig {
    let mut config = common::proxy_config(upstream);
    config.upstream.url = format!("https://{}/copilot?chunked=true", upstream);
    config.upstream.insecure_skip_upstream_verify = skip_verify;
    config
}

#[tokio::test]
async fn test_self_signed_upstream_accepted_when_verification_skipped() {
    let upstream = start_self_signed_upstream().await;
    let (proxy, shutdown) = common::start_proxy(https_config(upstream, true)).await;

    let res = common::client()
        .post(format!("http://{}/chat", proxy))
        .json(&json!({"message": "hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "secure hello");

    shutdown.trigger();
}

#[tokio::test]
async fn test_self_signed_upstream_rejected_when_verification_enabled() {
    let upstream = start_self_signed_upstream().await;
    let (proxy, shutdown) = common::start_proxy(https_config(upstream, false)).await;

    let res = common::client()
        .post(format!("http://{}/chat", proxy))
        .json(&json!({"message": "hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Failed to connect to copilot service");
    let message = body["message"].as_str().unwrap().to_lowercase();
    assert!(message.contains("certificate"), "unexpected message: {}", message);

    shutdown.trigger();
}
