//! Streaming behaviour: chunks are relayed as they arrive, never buffered whole.

use std::convert::Infallible;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::StatusCode,
    response::Response,
};
use futures_util::stream;
use serde_json::json;
use tokio::sync::{oneshot, Mutex, Notify};

mod common;

fn event_stream(body: Body) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "text/event-stream")
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn test_first_chunk_arrives_before_upstream_finishes() {
    let gate = Arc::new(Notify::new());
    let upstream_gate = gate.clone();

    let (upstream, _seen) = common::start_upstream(move || {
        let gate = upstream_gate.clone();
        async move {
            let first = stream::once(async { Ok::<_, Infallible>(Bytes::from_static(b"data: first\n\n")) });
            let second = stream::once(async move {
                gate.notified().await;
                Ok::<_, Infallible>(Bytes::from_static(b"data: second\n\n"))
            });
            event_stream(Body::from_stream(futures_util::StreamExt::chain(first, second)))
        }
    })
    .await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let mut res = common::client()
        .post(format!("http://{}/chat", proxy))
        .json(&json!({"message": "stream please"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/event-stream");

    // Upstream is still holding the second event back.
    let first = tokio::time::timeout(Duration::from_secs(5), res.chunk())
        .await
        .expect("first chunk should not wait for the full body")
        .unwrap()
        .expect("stream should not be finished");
    assert_eq!(first.as_ref(), b"data: first\n\n");

    gate.notify_one();

    let mut rest = Vec::new();
    while let Some(chunk) = res.chunk().await.unwrap() {
        rest.extend_from_slice(&chunk);
    }
    assert_eq!(rest, b"data: second\n\n");

    shutdown.trigger();
}

#[tokio::test]
async fn test_large_body_relayed_intact() {
    const CHUNK: usize = 64 * 1024;
    const CHUNKS: usize = 128; // 8 MiB

    let (upstream, _seen) = common::start_upstream(|| async {
        let chunks = stream::iter((0..CHUNKS).map(|i| {
            Ok::<_, Infallible>(Bytes::from(vec![(i % 251) as u8; CHUNK]))
        }));
        Response::new(Body::from_stream(chunks))
    })
    .await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let mut res = common::client()
        .post(format!("http://{}/chat", proxy))
        .json(&json!({"message": "big"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let mut total = 0usize;
    let mut chunks_seen = 0usize;
    while let Some(chunk) = res.chunk().await.unwrap() {
        for (offset, byte) in chunk.iter().enumerate() {
            let index = (total + offset) / CHUNK;
            assert_eq!(*byte, (index % 251) as u8, "corrupt byte at {}", total + offset);
        }
        total += chunk.len();
        chunks_seen += 1;
    }
    assert_eq!(total, CHUNK * CHUNKS);
    assert!(chunks_seen > 1, "body arrived in pieces");

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_failure_mid_stream_breaks_response() {
    let (upstream, _seen) = common::start_upstream(|| async {
        let first = stream::once(async { Ok::<_, io::Error>(Bytes::from_static(b"data: first\n\n")) });
        let failure = stream::once(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Err::<Bytes, _>(io::Error::other("upstream died"))
        });
        event_stream(Body::from_stream(futures_util::StreamExt::chain(first, failure)))
    })
    .await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let mut res = common::client()
        .post(format!("http://{}/chat", proxy))
        .json(&json!({"message": "fragile"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let first = res.chunk().await.unwrap().unwrap();
    assert_eq!(first.as_ref(), b"data: first\n\n");

    let outcome = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match res.chunk().await {
                Ok(Some(_)) => continue,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        }
    })
    .await
    .expect("broken stream should end promptly");
    assert!(outcome.is_err(), "caller should see a body error, not a clean end");

    shutdown.trigger();
}

/// Fires its sender when the upstream body is dropped.
struct DropSignal(Option<oneshot::Sender<()>>);

impl Drop for DropSignal {
    fn drop(&mut self) {
        if let Some(tx) = self.0.take() {
            let _ = tx.send(());
        }
    }
}

#[tokio::test]
async fn test_client_disconnect_releases_upstream() {
    let (dropped_tx, dropped_rx) = oneshot::channel();
    let slot = Arc::new(Mutex::new(Some(dropped_tx)));

    let (upstream, _seen) = common::start_upstream(move || {
        let slot = slot.clone();
        async move {
            let signal = DropSignal(slot.lock().await.take());
            let ticks = stream::unfold(signal, |signal| async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Some((Ok::<_, Infallible>(Bytes::from_static(b"data: tick\n\n")), signal))
            });
            event_stream(Body::from_stream(ticks))
        }
    })
    .await;
    let (proxy, shutdown) = common::start_proxy(common::proxy_config(upstream)).await;

    let mut res = common::client()
        .post(format!("http://{}/chat", proxy))
        .json(&json!({"message": "endless"}))
        .send()
        .await
        .unwrap();
    let first = res.chunk().await.unwrap().unwrap();
    assert!(first.starts_with(b"data: tick"));

    drop(res);

    tokio::time::timeout(Duration::from_secs(5), dropped_rx)
        .await
        .expect("upstream body should be dropped after the client leaves")
        .unwrap();

    shutdown.trigger();
}
