#![allow(clippy::unwrap_used)]
// Integration tests for `WsConnector` against a local tokio-tungstenite server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use cilia_api::{Connection, Connector, Error, FrameSink, WsConnector, endpoint_url};

// ── Helpers ─────────────────────────────────────────────────────────

async fn bind() -> (TcpListener, Url) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, endpoint_url("127.0.0.1", port).unwrap())
}

/// Accept one client and collect every text frame until it closes.
fn collect_frames(listener: TcpListener) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        let mut frames = Vec::new();
        while let Some(Ok(msg)) = ws.next().await {
            match msg {
                Message::Text(text) => frames.push(text.to_string()),
                Message::Close(_) => break,
                _ => {}
            }
        }
        frames
    })
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_frames_arrive_whole_and_in_order() {
    let (listener, url) = bind().await;
    let server = collect_frames(listener);

    let Connection { mut sink, closed } = assert_ok!(WsConnector.connect(&url).await);
    assert!(!closed.is_cancelled());

    assert_ok!(sink.send_text(r#"{"SetLight":[[1,255,0,0]]}"#.into()).await);
    assert_ok!(sink.send_text(r#"{"SetScent":[["Rose",64]]}"#.into()).await);
    assert_ok!(sink.close().await);

    let frames = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        frames,
        vec![
            r#"{"SetLight":[[1,255,0,0]]}"#.to_string(),
            r#"{"SetScent":[["Rose",64]]}"#.to_string(),
        ]
    );
}

#[tokio::test]
async fn test_peer_close_cancels_closed_token() {
    let (listener, url) = bind().await;
    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.close(None).await.unwrap();
        while ws.next().await.is_some() {}
    });

    let conn = assert_ok!(WsConnector.connect(&url).await);

    tokio::time::timeout(Duration::from_secs(5), conn.closed.cancelled())
        .await
        .expect("peer close should cancel the session token");
    server.await.unwrap();
}

#[tokio::test]
async fn test_connect_refused_is_transient_error() {
    let (listener, url) = bind().await;
    drop(listener);

    let Err(err) = WsConnector.connect(&url).await else {
        panic!("connecting to a closed port should fail");
    };
    assert!(
        matches!(err, Error::WebSocketConnect(_)),
        "expected WebSocketConnect, got: {err:?}"
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_send_after_close_fails() {
    let (listener, url) = bind().await;
    let server = collect_frames(listener);

    let mut conn = assert_ok!(WsConnector.connect(&url).await);
    assert_ok!(conn.sink.close().await);
    let _ = server.await;

    let result = conn.sink.send_text("{}".into()).await;
    assert!(result.is_err(), "send on a closed sink should fail");
}
