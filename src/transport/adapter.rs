//! Transport adapter
//!
//! One adapter runs per connection. It owns the read half of a client's
//! mailbox and a sink towards the peer, and it keeps forwarding until one
//! of three things happens:
//! - the transport reports a disconnect through the cancellation token
//! - the broker closes the mailbox (unregister or eviction)
//! - a write to the sink fails
//!
//! Whatever the reason, the client is unregistered exactly once when the
//! adapter returns. That is tied to a drop guard rather than to the return
//! sites, so early returns and panics are covered too.

use std::future::Future;

use futures_util::{Sink, SinkExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::BrokerHandle;
use crate::client::{Client, ClientId};
use crate::transport::message::ServerMessage;
use crate::utils::error::TransportError;

/// Per-connection output stream.
///
/// `send_event` writes one framed event and flushes it before resolving.
pub trait EventSink: Send {
    fn send_event(
        &mut self,
        event: &ServerMessage,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Adapts the write half of a WebSocket into an [`EventSink`].
///
/// Each event becomes one JSON text message; `SinkExt::send` flushes it.
pub struct WsEventSink<S>(pub S);

impl<S> EventSink for WsEventSink<S>
where
    S: Sink<WsMessage, Error = tungstenite::Error> + Unpin + Send,
{
    async fn send_event(&mut self, event: &ServerMessage) -> Result<(), TransportError> {
        let frame = event.to_frame()?;
        self.0.send(frame).await?;
        Ok(())
    }
}

/// Why an adapter stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterExit {
    /// The transport signalled that the peer went away.
    Disconnected,
    /// The broker closed the mailbox and everything buffered was written.
    MailboxClosed,
    /// Writing to the peer failed.
    TransportFailed,
}

/// Unregisters its client when dropped.
struct Registration {
    broker: BrokerHandle,
    client_id: ClientId,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.broker.unregister(self.client_id);
    }
}

/// Runs the adapter for one connection until it exits.
///
/// `capacity` is the mailbox size of the client created for this
/// connection. `disconnect` must be cancelled by the transport when the
/// peer goes away.
pub async fn serve_client<S: EventSink>(
    broker: BrokerHandle,
    capacity: usize,
    mut sink: S,
    disconnect: CancellationToken,
) -> AdapterExit {
    let (client, mut mailbox) = Client::new(capacity);
    let client_id = client.id();

    broker.register(client);
    let _registration = Registration {
        broker,
        client_id,
    };

    let greeting = ServerMessage::Connected {
        client_id: client_id.to_string(),
    };
    if let Err(err) = sink.send_event(&greeting).await {
        debug!(client = %client_id, error = %err, "failed to greet client");
        return AdapterExit::TransportFailed;
    }

    let exit = loop {
        tokio::select! {
            _ = disconnect.cancelled() => break AdapterExit::Disconnected,
            item = mailbox.recv() => {
                let Some(payload) = item else {
                    break AdapterExit::MailboxClosed;
                };
                let event = ServerMessage::Event {
                    data: payload.to_string(),
                };
                if let Err(err) = sink.send_event(&event).await {
                    debug!(client = %client_id, error = %err, "failed to deliver event");
                    break AdapterExit::TransportFailed;
                }
            }
        }
    };

    info!(client = %client_id, ?exit, "adapter finished");
    exit
}
