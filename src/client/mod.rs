//! The `client` module defines the representation of a subscriber.
//!
//! A [`Client`] owns exactly one [`Mailbox`]: the bounded queue the broker
//! writes into. The matching [`MailboxReceiver`] stays with the transport
//! adapter that drains it onto the network.

pub mod mailbox;
pub mod pubsub_client;

pub use mailbox::{Mailbox, MailboxReceiver, Payload};
pub use pubsub_client::{Client, ClientId, ClientState};
