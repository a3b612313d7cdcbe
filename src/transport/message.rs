use serde::{Deserialize, Serialize};
use tungstenite::protocol::Message as WsMessage;

use crate::utils::error::TransportError;

/// Frames sent by peers.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Broadcast `payload` to every connected subscriber.
    #[serde(rename = "publish")]
    Publish { payload: String },
}

/// Frames pushed to subscribers, one per WebSocket text message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// First frame on every stream.
    #[serde(rename = "connected")]
    Connected { client_id: String },

    /// One broadcast payload.
    #[serde(rename = "event")]
    Event { data: String },
}

impl ServerMessage {
    pub fn to_frame(&self) -> Result<WsMessage, TransportError> {
        Ok(WsMessage::text(serde_json::to_string(self)?))
    }
}
