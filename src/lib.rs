//! # PushHub
//!
//! `pushhub` is an in-process broadcast hub for streaming subscribers. One
//! broker task owns the set of connected clients; publishers hand it
//! payloads, and it fans each one out to every client's bounded mailbox
//! without ever waiting. A client that cannot take a payload right away is
//! evicted instead of slowing everyone else down.
//!
//! ## Core Modules
//!
//! - `broker`: the active set and the serialized loop that mutates it.
//! - `client`: subscriber handles and their mailboxes.
//! - `config`: loading server, broker and publisher settings.
//! - `publisher`: the periodic publisher.
//! - `transport`: the per-connection adapter and the WebSocket push server.
//! - `utils`: error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod publisher;
pub mod transport;
pub mod utils;
