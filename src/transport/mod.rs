//! The `transport` module bridges client mailboxes to the network.
//!
//! [`adapter`] is the per-connection worker: it registers a client, drains
//! its mailbox into an [`adapter::EventSink`] and unregisters on the way out.
//! [`websocket`] provides the concrete push server the adapter runs behind,
//! and [`message`] the JSON frames exchanged over it.

pub mod adapter;
pub mod message;
pub mod websocket;

pub use adapter::{AdapterExit, EventSink, serve_client};
pub use message::{ClientMessage, ServerMessage};
pub use websocket::{serve, start_websocket_server};

#[cfg(test)]
mod tests;
