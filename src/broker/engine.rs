//! Broker engine
//!
//! In-memory broker state responsible for:
//! - tracking the set of active clients
//! - fanning a payload out to every active client without waiting
//! - evicting clients whose mailbox refuses a payload
//!
//! The API is synchronous and takes `&mut self`. It is meant to be owned by
//! the broker loop in [`crate::broker::service`], which is what makes the
//! mutations race free.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::client::{Client, ClientId, Payload};

#[derive(Debug, Default)]
pub struct Broker {
    clients: HashMap<ClientId, Client>,
}

impl Broker {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Adds `client` to the active set.
    ///
    /// Registering an id that is already active, or a client that is
    /// already closed, is a caller bug; it is logged and ignored.
    pub fn register(&mut self, mut client: Client) {
        let id = client.id();
        if self.clients.contains_key(&id) {
            warn!(client = %id, "client already registered; ignoring");
            return;
        }
        if client.is_closed() {
            warn!(client = %id, "refusing to register a closed client");
            client.close();
            return;
        }

        client.activate();
        self.clients.insert(id, client);
        info!(client = %id, total = self.clients.len(), "client registered");
    }

    /// Removes `id` from the active set and closes its mailbox.
    ///
    /// Unknown or already removed ids are a no-op.
    pub fn unregister(&mut self, id: &ClientId) {
        match self.clients.remove(id) {
            Some(mut client) => {
                client.close();
                info!(client = %id, total = self.clients.len(), "client unregistered");
            }
            None => debug!(client = %id, "unregister for inactive client ignored"),
        }
    }

    /// Offers `payload` to every active client.
    ///
    /// A client whose mailbox rejects the payload is evicted on the spot,
    /// exactly as if it had been unregistered.
    pub fn broadcast(&mut self, payload: &Payload) {
        self.clients.retain(|id, client| match client.try_deliver(payload.clone()) {
            Ok(()) => true,
            Err(err) => {
                client.close();
                warn!(client = %id, reason = err.as_label(), "evicting client");
                false
            }
        });
        debug!(recipients = self.clients.len(), "broadcast fanned out");
    }

    pub fn active_count(&self) -> usize {
        self.clients.len()
    }

    pub fn is_active(&self, id: &ClientId) -> bool {
        self.clients.contains_key(id)
    }

    pub fn active_ids(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.clients.keys().copied()
    }
}
