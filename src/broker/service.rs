//! The serialized broker loop.
//!
//! [`spawn`] moves a [`Broker`] into its own task. From then on the only way
//! to reach it is a [`BrokerHandle`], which feeds three intakes:
//! registrations, unregistrations and broadcasts. The loop takes one event
//! at a time, so the active set needs no lock.
//!
//! Each intake is FIFO. Across intakes the loop prefers registrations, then
//! unregistrations, then broadcasts, which means a register or unregister
//! submitted before a broadcast is always applied before it.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::broker::engine::Broker;
use crate::client::{Client, ClientId, Payload};

/// Cloneable entry point to a running broker loop.
///
/// Every method returns immediately. Requests made after the loop has
/// stopped are dropped.
#[derive(Debug, Clone)]
pub struct BrokerHandle {
    register_tx: mpsc::UnboundedSender<Client>,
    unregister_tx: mpsc::UnboundedSender<ClientId>,
    broadcast_tx: mpsc::UnboundedSender<Payload>,
}

impl BrokerHandle {
    /// Hands `client` to the broker; later broadcasts will reach it.
    pub fn register(&self, client: Client) {
        if let Err(mpsc::error::SendError(client)) = self.register_tx.send(client) {
            debug!(client = %client.id(), "broker loop is gone; registration dropped");
        }
    }

    /// Removes and closes `id`. Safe to call any number of times.
    pub fn unregister(&self, id: ClientId) {
        if self.unregister_tx.send(id).is_err() {
            debug!(client = %id, "broker loop is gone; unregister dropped");
        }
    }

    /// Fans `payload` out to every client active when the broadcast is
    /// processed. Fire and forget.
    pub fn broadcast(&self, payload: impl Into<Payload>) {
        if self.broadcast_tx.send(payload.into()).is_err() {
            debug!("broker loop is gone; broadcast dropped");
        }
    }

    /// True once the broker loop has stopped accepting requests.
    pub fn is_closed(&self) -> bool {
        self.broadcast_tx.is_closed()
    }
}

struct Intakes {
    register: mpsc::UnboundedReceiver<Client>,
    unregister: mpsc::UnboundedReceiver<ClientId>,
    broadcast: mpsc::UnboundedReceiver<Payload>,
}

/// Starts the broker loop on the current tokio runtime.
///
/// The loop runs until every [`BrokerHandle`] has been dropped, then hands
/// the final state back through the join handle.
pub fn spawn(broker: Broker) -> (BrokerHandle, JoinHandle<Broker>) {
    let (register_tx, register) = mpsc::unbounded_channel();
    let (unregister_tx, unregister) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast) = mpsc::unbounded_channel();

    let handle = BrokerHandle {
        register_tx,
        unregister_tx,
        broadcast_tx,
    };
    let intakes = Intakes {
        register,
        unregister,
        broadcast,
    };

    (handle, tokio::spawn(run(broker, intakes)))
}

async fn run(mut broker: Broker, mut intakes: Intakes) -> Broker {
    info!("broker loop started");

    loop {
        tokio::select! {
            biased;
            Some(client) = intakes.register.recv() => broker.register(client),
            Some(id) = intakes.unregister.recv() => broker.unregister(&id),
            Some(payload) = intakes.broadcast.recv() => broker.broadcast(&payload),
            else => break,
        }
    }

    info!(remaining = broker.active_count(), "broker loop stopped");
    broker
}
