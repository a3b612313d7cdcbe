use std::convert::Infallible;
use std::time::Duration;

use futures_util::SinkExt;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::broker::{Broker, BrokerHandle, spawn};
use crate::transport::adapter::{AdapterExit, EventSink, WsEventSink, serve_client};
use crate::transport::message::{ClientMessage, ServerMessage};
use crate::utils::error::TransportError;

/// Forwards every event to a channel so the test can watch the stream.
struct ChannelSink(mpsc::UnboundedSender<ServerMessage>);

impl EventSink for ChannelSink {
    async fn send_event(&mut self, event: &ServerMessage) -> Result<(), TransportError> {
        self.0.send(event.clone()).map_err(|_| TransportError::Closed)
    }
}

/// Accepts `remaining` events, then fails every write.
struct FailingSink {
    remaining: usize,
}

impl EventSink for FailingSink {
    async fn send_event(&mut self, _event: &ServerMessage) -> Result<(), TransportError> {
        if self.remaining == 0 {
            return Err(TransportError::Closed);
        }
        self.remaining -= 1;
        Ok(())
    }
}

fn event(data: &str) -> ServerMessage {
    ServerMessage::Event {
        data: data.to_string(),
    }
}

/// Stops the broker and waits for its final state.
async fn finish(handle: BrokerHandle, task: tokio::task::JoinHandle<Broker>) -> Broker {
    drop(handle);
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("broker loop did not stop")
        .unwrap()
}

#[test]
fn test_parse_publish() {
    let msg = json!({ "type": "publish", "payload": "hello" }).to_string();
    match serde_json::from_str::<ClientMessage>(&msg).unwrap() {
        ClientMessage::Publish { payload } => assert_eq!(payload, "hello"),
    }
}

#[test]
fn test_unknown_client_message_is_rejected() {
    let msg = json!({ "type": "subscribe", "topic": "t" }).to_string();
    assert!(serde_json::from_str::<ClientMessage>(&msg).is_err());
}

#[test]
fn test_server_frames() {
    let frame = event("x").to_frame().unwrap();
    let value: serde_json::Value = serde_json::from_str(frame.to_text().unwrap()).unwrap();
    assert_eq!(value, json!({ "type": "event", "data": "x" }));

    let connected = ServerMessage::Connected {
        client_id: "client-1".to_string(),
    };
    let value: serde_json::Value =
        serde_json::from_str(connected.to_frame().unwrap().to_text().unwrap()).unwrap();
    assert_eq!(value, json!({ "type": "connected", "client_id": "client-1" }));
}

fn never(err: Infallible) -> tungstenite::Error {
    match err {}
}

#[tokio::test]
async fn test_ws_event_sink_writes_one_text_frame_per_event() {
    let mut sink = WsEventSink(Vec::<tungstenite::Message>::new().sink_map_err(never));

    sink.send_event(&event("a")).await.unwrap();
    sink.send_event(&event("b")).await.unwrap();

    let frames: Vec<ServerMessage> = sink
        .0
        .get_ref()
        .iter()
        .map(|frame| serde_json::from_str(frame.to_text().unwrap()).unwrap())
        .collect();
    assert_eq!(frames, vec![event("a"), event("b")]);
}

#[tokio::test]
async fn test_adapter_greets_then_forwards_broadcasts() {
    let (handle, task) = spawn(Broker::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let disconnect = CancellationToken::new();

    let adapter = tokio::spawn(serve_client(
        handle.clone(),
        8,
        ChannelSink(tx),
        disconnect.clone(),
    ));

    let greeting = rx.recv().await.unwrap();
    assert!(matches!(greeting, ServerMessage::Connected { .. }));

    handle.broadcast("m1");
    handle.broadcast("m2");
    assert_eq!(rx.recv().await.unwrap(), event("m1"));
    assert_eq!(rx.recv().await.unwrap(), event("m2"));

    disconnect.cancel();
    assert_eq!(adapter.await.unwrap(), AdapterExit::Disconnected);
    assert_eq!(finish(handle, task).await.active_count(), 0);
}

#[tokio::test]
async fn test_adapter_exits_when_evicted() {
    let (handle, task) = spawn(Broker::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let disconnect = CancellationToken::new();

    let adapter = tokio::spawn(serve_client(
        handle.clone(),
        1,
        ChannelSink(tx),
        disconnect.clone(),
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        ServerMessage::Connected { .. }
    ));

    // A burst queued back to back overflows the one-slot mailbox before
    // the adapter gets a chance to drain it.
    for n in 0..64 {
        handle.broadcast(format!("burst {n}"));
    }

    let exit = tokio::time::timeout(Duration::from_secs(5), adapter)
        .await
        .expect("adapter did not stop")
        .unwrap();
    assert_eq!(exit, AdapterExit::MailboxClosed);
    assert!(!disconnect.is_cancelled());
    assert_eq!(finish(handle, task).await.active_count(), 0);
}

#[tokio::test]
async fn test_adapter_stops_on_write_failure() {
    let (handle, task) = spawn(Broker::new());
    let disconnect = CancellationToken::new();

    let adapter = tokio::spawn(serve_client(
        handle.clone(),
        8,
        FailingSink { remaining: 1 },
        disconnect.clone(),
    ));

    // Keep broadcasting until the adapter has registered and tried a write.
    let exit = loop {
        handle.broadcast("tick");
        if adapter.is_finished() {
            break adapter.await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    };

    assert_eq!(exit, AdapterExit::TransportFailed);
    assert_eq!(finish(handle, task).await.active_count(), 0);
}

#[tokio::test]
async fn test_adapter_stops_when_greeting_fails() {
    let (handle, task) = spawn(Broker::new());
    let exit = serve_client(
        handle.clone(),
        8,
        FailingSink { remaining: 0 },
        CancellationToken::new(),
    )
    .await;

    assert_eq!(exit, AdapterExit::TransportFailed);
    assert_eq!(finish(handle, task).await.active_count(), 0);
}

#[tokio::test]
async fn test_dropped_adapter_still_unregisters() {
    let (handle, task) = spawn(Broker::new());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let adapter = tokio::spawn(serve_client(
        handle.clone(),
        8,
        ChannelSink(tx),
        CancellationToken::new(),
    ));
    rx.recv().await.unwrap();

    adapter.abort();
    let _ = adapter.await;
    assert_eq!(finish(handle, task).await.active_count(), 0);
}
