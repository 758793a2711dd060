//! WebSocket Source Tests
//!
//! Runs the real `WebSocketSource` against a throwaway local websocket
//! server that plays back canned Jetstream frames.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::SinkExt;
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

use beeper_core::jetstream::{
    EventHandler, EventSource, ReconnectLoop, ReconnectPolicy, SessionEnd, StreamError,
    WantedCollections, WebSocketSource,
};
use beeper_core::{CursorPolicy, StreamCursor};

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Helpers
// ============================================================================

/// Forwards every delivered collection to a channel
struct ChannelHandler(mpsc::UnboundedSender<String>);

#[async_trait]
impl EventHandler for ChannelHandler {
    async fn handle_commit(&self, collection: &str) {
        let _ = self.0.send(collection.to_string());
    }
}

fn handler() -> (ChannelHandler, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelHandler(tx), rx)
}

fn commit(time_us: i64, collection: &str) -> String {
    format!(
        r#"{{"did":"did:plc:tester","time_us":{time_us},"kind":"commit","commit":{{"rev":"3l3","operation":"create","collection":"{collection}","rkey":"3l3x","record":{{}}}}}}"#
    )
}

fn identity(time_us: i64) -> String {
    format!(
        r#"{{"did":"did:plc:tester","time_us":{time_us},"kind":"identity","identity":{{"did":"did:plc:tester","seq":1}}}}"#
    )
}

/// What the fake server does with each accepted connection
enum Script {
    /// Send frames, then a close frame
    SendAndClose(Vec<String>),
    /// Send frames, then hold the connection open until told to stop
    SendAndHold(Vec<String>, oneshot::Receiver<()>),
}

/// Accept one connection per script entry; yields the request URIs
async fn serve(scripts: Vec<Script>) -> (SocketAddr, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut uris = Vec::new();
        for script in scripts {
            let (tcp, _) = listener.accept().await.unwrap();
            let (uri_tx, uri_rx) = oneshot::channel();
            let mut ws = tokio_tungstenite::accept_hdr_async(
                tcp,
                move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                    let _ = uri_tx.send(req.uri().to_string());
                    Ok(resp)
                },
            )
            .await
            .unwrap();
            uris.push(uri_rx.await.unwrap());

            match script {
                Script::SendAndClose(frames) => {
                    for frame in frames {
                        ws.send(Message::Text(frame)).await.unwrap();
                    }
                    let _ = ws.close(None).await;
                }
                Script::SendAndHold(frames, stop) => {
                    for frame in frames {
                        ws.send(Message::Text(frame)).await.unwrap();
                    }
                    let _ = stop.await;
                }
            }
        }
        uris
    });

    (addr, handle)
}

fn source_for(addr: SocketAddr) -> WebSocketSource {
    WebSocketSource::new(
        format!("ws://{addr}/subscribe"),
        WantedCollections::default(),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_session_delivers_watched_commits_in_order() {
    let (addr, server) = serve(vec![Script::SendAndClose(vec![
        commit(100, "org.xcvr.lrc.message"),
        commit(110, "app.bsky.feed.post"),
        identity(120),
        "garbage".to_string(),
        commit(130, "org.xcvr.lrc.signet"),
        commit(140, "org.xcvr.actor.profile"),
    ])])
    .await;

    let (handler, mut delivered) = handler();
    let (_shutdown_tx, mut shutdown) = watch::channel(false);
    let mut cursor = StreamCursor::new(42, CursorPolicy::Fixed);
    let mut source = source_for(addr);

    let end = timeout(
        TEST_TIMEOUT,
        source.run_session(&mut cursor, &handler, &mut shutdown),
    )
    .await
    .expect("session timed out")
    .expect("session failed");

    assert_eq!(end, SessionEnd::Closed);

    let mut got = Vec::new();
    while let Ok(collection) = delivered.try_recv() {
        got.push(collection);
    }
    assert_eq!(
        got,
        vec![
            "org.xcvr.lrc.message",
            "org.xcvr.lrc.signet",
            "org.xcvr.actor.profile",
        ]
    );
    // Five decodable events; the garbage frame is skipped
    assert_eq!(cursor.processed(), 5);

    let uris = server.await.unwrap();
    assert_eq!(uris.len(), 1);
    assert!(uris[0].starts_with("/subscribe?wantedCollections=org.xcvr.actor.profile"));
    assert!(uris[0].ends_with("&cursor=42"));
}

#[tokio::test]
async fn test_connect_failure_is_reported() {
    // Grab a free port and release it so nothing is listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (handler, _delivered) = handler();
    let (_shutdown_tx, mut shutdown) = watch::channel(false);
    let mut cursor = StreamCursor::new(0, CursorPolicy::Fixed);

    let result = timeout(
        TEST_TIMEOUT,
        source_for(addr).run_session(&mut cursor, &handler, &mut shutdown),
    )
    .await
    .expect("session timed out");

    assert!(matches!(result, Err(StreamError::Connect { .. })));
}

#[tokio::test]
async fn test_shutdown_ends_live_session() {
    let (stop_tx, stop_rx) = oneshot::channel();
    let (addr, server) = serve(vec![Script::SendAndHold(
        vec![commit(100, "org.xcvr.feed.channel")],
        stop_rx,
    )])
    .await;

    let (handler, mut delivered) = handler();
    let (shutdown_tx, mut shutdown) = watch::channel(false);
    let mut cursor = StreamCursor::new(0, CursorPolicy::Fixed);
    let mut source = source_for(addr);

    let session = tokio::spawn(async move {
        source
            .run_session(&mut cursor, &handler, &mut shutdown)
            .await
    });

    // Wait for the first event so we know the session is live
    let first = timeout(TEST_TIMEOUT, delivered.recv()).await.unwrap();
    assert_eq!(first.as_deref(), Some("org.xcvr.feed.channel"));

    shutdown_tx.send(true).unwrap();
    let end = timeout(TEST_TIMEOUT, session)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(end, SessionEnd::Cancelled);

    let _ = stop_tx.send(());
    server.await.unwrap();
}

#[tokio::test]
async fn test_loop_reconnects_with_fixed_cursor() {
    let (addr, server) = serve(vec![
        Script::SendAndClose(vec![commit(5_000, "org.xcvr.lrc.message")]),
        Script::SendAndClose(vec![commit(6_000, "org.xcvr.lrc.message")]),
    ])
    .await;

    let (handler, mut delivered) = handler();
    let (shutdown_tx, shutdown) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    let consumer = tokio::spawn(async move {
        let mut cursor = StreamCursor::new(1_000, CursorPolicy::Fixed);
        let mut consume = ReconnectLoop::new(source_for(addr), ReconnectPolicy::immediate());
        consume.run(&mut cursor, &handler, shutdown).await
    });

    for _ in 0..2 {
        let got = timeout(TEST_TIMEOUT, delivered.recv()).await.unwrap();
        assert_eq!(got.as_deref(), Some("org.xcvr.lrc.message"));
    }

    let uris = timeout(TEST_TIMEOUT, server).await.unwrap().unwrap();
    assert_eq!(uris.len(), 2);
    // Both subscriptions asked for the startup cursor
    assert!(uris.iter().all(|uri| uri.ends_with("&cursor=1000")));

    shutdown_tx.send(true).unwrap();
    let stats = timeout(TEST_TIMEOUT, consumer).await.unwrap().unwrap();
    assert!(stats.sessions >= 2);
    assert!(stats.closes >= 2);
}
