//! Integration tests for the WebSocket transport against an in-process bridge.

use std::future::Future;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use webterm_core::{
    ConnectRequest, ConnectionDescriptor, ProtocolErrorKind, TransportError, TransportEvent,
    TransportSettings,
};
use webterm_transport::{Transport, WebSocketTransport};

type Bridge = WebSocketStream<TcpStream>;

/// Accept one client and run `script` against it. Returns the endpoint.
async fn spawn_bridge<F, Fut>(script: F) -> String
where
    F: FnOnce(Bridge) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        script(ws).await;
    });
    format!("ws://{addr}/terminal")
}

async fn next_frame(ws: &mut Bridge) -> Option<(String, Value)> {
    while let Some(message) = ws.next().await {
        match message.ok()? {
            Message::Text(text) => {
                let frame: Value = serde_json::from_str(&text).unwrap();
                let event = frame["event"].as_str().unwrap().to_string();
                return Some((event, frame["data"].clone()));
            }
            Message::Close(_) => return None,
            _ => continue,
        }
    }
    None
}

async fn send_frame(ws: &mut Bridge, event: &str, data: Value) {
    let frame = json!({ "event": event, "data": data }).to_string();
    ws.send(Message::Text(frame)).await.unwrap();
}

/// Answer the readiness probe and return the `ssh-connect` payload.
async fn handshake(ws: &mut Bridge) -> Value {
    let (event, data) = next_frame(ws).await.unwrap();
    assert_eq!(event, "socket-check");
    assert!(data["timestamp"].as_i64().unwrap() > 0);
    send_frame(ws, "socket-check-ack", json!({ "id": data["id"], "ready": true })).await;

    let (event, data) = next_frame(ws).await.unwrap();
    assert_eq!(event, "ssh-connect");
    data
}

fn settings(endpoint: String) -> TransportSettings {
    TransportSettings {
        endpoint,
        probe_timeout_ms: 500,
        warmup_delay_ms: 50,
        ..TransportSettings::default()
    }
}

fn request(retry: bool) -> ConnectRequest {
    let descriptor = ConnectionDescriptor::parse("10.0.0.5:admin:s3cret").unwrap();
    ConnectRequest::from_descriptor(&descriptor, retry)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<TransportEvent>) -> TransportEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for transport event")
        .expect("event channel closed")
}

#[tokio::test]
async fn test_session_lifecycle_events() {
    let endpoint = spawn_bridge(|mut ws| async move {
        let connect = handshake(&mut ws).await;
        assert_eq!(connect["host"], "10.0.0.5");
        assert_eq!(connect["port"], 22);
        assert_eq!(connect["username"], "admin");
        assert_eq!(connect["password"], "s3cret");
        assert!(connect.get("retry").is_none());

        send_frame(&mut ws, "ssh-connected", json!({})).await;
        send_frame(&mut ws, "ssh-data", json!({ "data": "hello\r\n" })).await;
        send_frame(
            &mut ws,
            "ssh-error",
            json!({ "message": "connect ECONNREFUSED 127.0.0.1:22" }),
        )
        .await;
        ws.close(None).await.unwrap();
    })
    .await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut transport = WebSocketTransport::new(settings(endpoint), tx);
    transport.connect(request(false)).unwrap();

    assert_eq!(next_event(&mut rx).await, TransportEvent::Connected);
    assert_eq!(
        next_event(&mut rx).await,
        TransportEvent::Data("hello\r\n".to_string())
    );
    match next_event(&mut rx).await {
        TransportEvent::Error(err) => {
            assert_eq!(err.kind(), Some(ProtocolErrorKind::HostFallback));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(
        next_event(&mut rx).await,
        TransportEvent::Closed("channel closed".to_string())
    );
}

#[tokio::test]
async fn test_missing_ack_still_connects_after_warmup() {
    let (seen_tx, seen_rx) = oneshot::channel();
    let endpoint = spawn_bridge(|mut ws| async move {
        let (event, _) = next_frame(&mut ws).await.unwrap();
        assert_eq!(event, "socket-check");
        let probed = Instant::now();

        let (event, _) = next_frame(&mut ws).await.unwrap();
        assert_eq!(event, "ssh-connect");
        seen_tx.send(probed.elapsed()).unwrap();

        send_frame(&mut ws, "ssh-connected", json!({})).await;
        let _ = next_frame(&mut ws).await;
    })
    .await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let settings = TransportSettings {
        probe_timeout_ms: 100,
        warmup_delay_ms: 100,
        ..settings(endpoint)
    };
    let mut transport = WebSocketTransport::new(settings, tx);
    transport.connect(request(false)).unwrap();

    assert_eq!(next_event(&mut rx).await, TransportEvent::Connected);
    let waited = seen_rx.await.unwrap();
    assert!(waited >= Duration::from_millis(200), "waited {waited:?}");
}

#[tokio::test]
async fn test_not_ready_ack_waits_then_connects() {
    let endpoint = spawn_bridge(|mut ws| async move {
        let (_, data) = next_frame(&mut ws).await.unwrap();
        send_frame(&mut ws, "socket-check-ack", json!({ "id": data["id"], "ready": false })).await;

        let (event, _) = next_frame(&mut ws).await.unwrap();
        assert_eq!(event, "ssh-connect");
        send_frame(&mut ws, "ssh-connected", json!({})).await;
        let _ = next_frame(&mut ws).await;
    })
    .await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut transport = WebSocketTransport::new(settings(endpoint), tx);
    transport.connect(request(false)).unwrap();
    assert_eq!(next_event(&mut rx).await, TransportEvent::Connected);
}

#[tokio::test]
async fn test_commands_and_disconnect() {
    let (seen_tx, seen_rx) = oneshot::channel();
    let endpoint = spawn_bridge(|mut ws| async move {
        handshake(&mut ws).await;
        send_frame(&mut ws, "ssh-connected", json!({})).await;

        let mut seen = Vec::new();
        while let Some((event, data)) = next_frame(&mut ws).await {
            seen.push((event, data));
        }
        seen_tx.send(seen).unwrap();
    })
    .await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut transport = WebSocketTransport::new(settings(endpoint), tx);
    transport.connect(request(false)).unwrap();
    assert_eq!(next_event(&mut rx).await, TransportEvent::Connected);

    transport.send_command("ls -la").unwrap();
    transport.send_interrupt().unwrap();
    transport.disconnect();
    assert!(!transport.is_open());

    let seen = tokio::time::timeout(Duration::from_secs(5), seen_rx)
        .await
        .unwrap()
        .unwrap();
    let events: Vec<&str> = seen.iter().map(|(event, _)| event.as_str()).collect();
    assert_eq!(events, ["ssh-command", "ssh-interrupt", "ssh-disconnect"]);
    assert_eq!(seen[0].1["command"], "ls -la");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err(), "no events after disconnect");
    assert!(transport.send_command("pwd").is_err());
}

#[tokio::test]
async fn test_reconnect_reuses_live_channel() {
    let endpoint = spawn_bridge(|mut ws| async move {
        handshake(&mut ws).await;
        send_frame(&mut ws, "ssh-error", json!({ "message": "Host is required" })).await;

        let retry = handshake(&mut ws).await;
        assert_eq!(retry["retry"], true);
        send_frame(&mut ws, "ssh-connected", json!({})).await;
        let _ = next_frame(&mut ws).await;
    })
    .await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut transport = WebSocketTransport::new(settings(endpoint), tx);
    transport.connect(request(false)).unwrap();

    match next_event(&mut rx).await {
        TransportEvent::Error(err) => assert!(err.is_host_fallback()),
        other => panic!("unexpected event {other:?}"),
    }

    transport.connect(request(true)).unwrap();
    assert_eq!(next_event(&mut rx).await, TransportEvent::Connected);
}

#[tokio::test]
async fn test_remote_error_is_not_fallback() {
    let endpoint = spawn_bridge(|mut ws| async move {
        handshake(&mut ws).await;
        send_frame(
            &mut ws,
            "ssh-error",
            json!({ "message": "All configured authentication methods failed" }),
        )
        .await;
        let _ = next_frame(&mut ws).await;
    })
    .await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut transport = WebSocketTransport::new(settings(endpoint), tx);
    transport.connect(request(false)).unwrap();

    assert_eq!(
        next_event(&mut rx).await,
        TransportEvent::Error(TransportError::protocol(
            ProtocolErrorKind::Remote,
            "All configured authentication methods failed"
        ))
    );
}
