//! The `error` module defines the error types used within `pushhub`.
//!
//! None of these ever escape the broker loop. Enqueue failures are turned
//! into evictions, transport failures into a clean adapter exit, and only
//! [`ServerError`] is allowed to reach `main`, where it is fatal.

use thiserror::Error;

/// Why a non-blocking enqueue into a client mailbox was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueError {
    /// The mailbox is at capacity; its reader is not keeping up.
    #[error("mailbox is full")]
    Full,

    /// The mailbox was closed, or its reader is gone.
    #[error("mailbox is closed")]
    Closed,
}

impl EnqueueError {
    /// Returns a short stable label for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EnqueueError::Full => "slow_consumer",
            EnqueueError::Closed => "closed_consumer",
        }
    }
}

/// A failure writing to a client's network stream.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    /// The peer went away before the write could be attempted.
    #[error("connection closed")]
    Closed,
}

/// Errors that abort process startup.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
