//! Bounded per-subscriber message queue.
//!
//! The write half ([`Mailbox`]) never awaits: `try_enqueue` either accepts
//! the payload immediately or reports why it could not. Closing the write
//! half lets the reader drain what is already buffered and then observe the
//! end of the stream.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::utils::error::EnqueueError;

/// Shared, immutable broadcast payload. One allocation per broadcast,
/// regardless of how many mailboxes it lands in.
pub type Payload = Arc<str>;

/// Creates a mailbox pair holding at most `capacity` undelivered payloads.
///
/// A capacity of zero is raised to one.
pub fn channel(capacity: usize) -> (Mailbox, MailboxReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (
        Mailbox {
            sender: Some(sender),
        },
        MailboxReceiver { receiver },
    )
}

/// Write half of a mailbox, held by the broker.
#[derive(Debug)]
pub struct Mailbox {
    sender: Option<mpsc::Sender<Payload>>,
}

impl Mailbox {
    /// Attempts to enqueue `payload` without waiting.
    pub fn try_enqueue(&self, payload: Payload) -> Result<(), EnqueueError> {
        let sender = self.sender.as_ref().ok_or(EnqueueError::Closed)?;
        sender.try_send(payload).map_err(|err| match err {
            TrySendError::Full(_) => EnqueueError::Full,
            TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }

    /// Closes the mailbox. Returns `true` only for the call that closed it.
    pub fn close(&mut self) -> bool {
        self.sender.take().is_some()
    }

    /// True once `close` was called or the reader has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.as_ref().is_none_or(|sender| sender.is_closed())
    }
}

/// Read half of a mailbox, held by the transport adapter.
#[derive(Debug)]
pub struct MailboxReceiver {
    receiver: mpsc::Receiver<Payload>,
}

impl MailboxReceiver {
    /// Waits for the next payload.
    ///
    /// Returns `None` once the mailbox is closed and everything buffered
    /// before the close has been handed out.
    pub async fn recv(&mut self) -> Option<Payload> {
        self.receiver.recv().await
    }

    /// Number of payloads waiting to be drained.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
