//! Client representation
//!
//! `Client` is the broker-side handle of one subscriber. It is created when a
//! connection is accepted, handed to the broker on registration, and closed
//! exactly once, either by an explicit unregister or by eviction.

use std::fmt;

use uuid::Uuid;

use crate::client::mailbox::{self, Mailbox, MailboxReceiver, Payload};
use crate::utils::error::EnqueueError;

/// Opaque, comparable subscriber identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Lifecycle of a client as seen by the broker.
///
/// `Unregistered -> Active -> Closed`; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Unregistered,
    Active,
    Closed,
}

#[derive(Debug)]
pub struct Client {
    id: ClientId,
    mailbox: Mailbox,
    state: ClientState,
}

impl Client {
    /// Creates a client with a fresh mailbox of the given capacity and
    /// returns the read half alongside it.
    pub fn new(capacity: usize) -> (Self, MailboxReceiver) {
        let (mailbox, receiver) = mailbox::channel(capacity);
        let client = Self {
            id: ClientId::new(),
            mailbox,
            state: ClientState::Unregistered,
        };
        (client, receiver)
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Marks the client as registered. Has no effect on a closed client.
    pub fn activate(&mut self) {
        if self.state == ClientState::Unregistered {
            self.state = ClientState::Active;
        }
    }

    /// Non-blocking delivery into this client's mailbox.
    pub fn try_deliver(&self, payload: Payload) -> Result<(), EnqueueError> {
        self.mailbox.try_enqueue(payload)
    }

    /// Closes the mailbox and moves to `Closed`.
    ///
    /// Returns `true` for the first call only; later calls change nothing.
    pub fn close(&mut self) -> bool {
        if self.state == ClientState::Closed {
            return false;
        }
        self.state = ClientState::Closed;
        self.mailbox.close()
    }

    /// True if nothing can be delivered to this client any more.
    pub fn is_closed(&self) -> bool {
        self.state == ClientState::Closed || self.mailbox.is_closed()
    }
}
