//! WebSocket transport
//!
//! A minimal push server in front of the broker. Responsibilities:
//! - accept TCP/WebSocket connections, up to `max_connections` at a time
//! - run a transport adapter per connection against the write half
//! - watch the read half: close frames, EOF and read errors become the
//!   adapter's disconnect signal, `publish` frames become broadcasts

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio_tungstenite::accept_async;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::BrokerHandle;
use crate::config::BrokerSettings;
use crate::transport::adapter::{WsEventSink, serve_client};
use crate::transport::message::ClientMessage;
use crate::utils::error::ServerError;

/// Binds `addr` and serves WebSocket subscribers forever.
///
/// Only a bind failure is returned; per-connection failures are logged.
pub async fn start_websocket_server(
    addr: &str,
    broker: BrokerHandle,
    settings: BrokerSettings,
) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    info!("WebSocket server listening on ws://{addr}");
    serve(listener, broker, settings).await;
    Ok(())
}

/// Accept loop over an already bound listener.
pub async fn serve(listener: TcpListener, broker: BrokerHandle, settings: BrokerSettings) {
    let connections = Arc::new(Semaphore::new(settings.max_connections));

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "failed to accept connection");
                continue;
            }
        };

        let Ok(permit) = Arc::clone(&connections).try_acquire_owned() else {
            warn!(%peer, limit = settings.max_connections, "connection limit reached; refusing");
            continue;
        };

        let broker = broker.clone();
        let capacity = settings.mailbox_capacity;
        tokio::spawn(async move {
            handle_connection(stream, peer, broker, capacity).await;
            drop(permit);
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    broker: BrokerHandle,
    capacity: usize,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer, error = %e, "WebSocket handshake error");
            return;
        }
    };
    let (ws_sender, ws_receiver) = ws_stream.split();

    let disconnect = CancellationToken::new();
    let reader = tokio::spawn(read_loop(
        ws_receiver,
        broker.clone(),
        disconnect.clone(),
        peer,
    ));

    let exit = serve_client(broker, capacity, WsEventSink(ws_sender), disconnect.clone()).await;

    // The adapter may have stopped on its own (eviction, write failure);
    // release the reader so the socket gets dropped.
    disconnect.cancel();
    let _ = reader.await;

    info!(%peer, ?exit, "connection closed");
}

async fn read_loop<S>(
    mut ws_receiver: S,
    broker: BrokerHandle,
    disconnect: CancellationToken,
    peer: SocketAddr,
) where
    S: Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
{
    loop {
        let next = tokio::select! {
            _ = disconnect.cancelled() => return,
            next = ws_receiver.next() => next,
        };

        match next {
            Some(Ok(WsMessage::Text(text))) => handle_client_message(&broker, peer, text.as_str()),
            Some(Ok(WsMessage::Close(_))) | None => break,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                debug!(%peer, error = %e, "read failed");
                break;
            }
        }
    }

    disconnect.cancel();
}

fn handle_client_message(broker: &BrokerHandle, peer: SocketAddr, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Publish { payload }) => {
            debug!(%peer, "publish received");
            broker.broadcast(payload);
        }
        Err(err) => {
            warn!(
                %peer,
                error = %err,
                "invalid client message: {}",
                text.chars().take(100).collect::<String>()
            );
        }
    }
}
