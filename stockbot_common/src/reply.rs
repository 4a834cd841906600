//! Outbound chat reply payload.
//!
//! A `BotReply` is published to the chat queue as `{"roomId": "...", "message": "..."}`.
use serde::{Deserialize, Serialize};

use crate::net::BOT_ERROR_MESSAGE;

/// Reply addressed to a chat room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotReply {
    /// Target room.
    pub room_id: String,
    /// Text shown in the room.
    pub message: String,
}

impl BotReply {
    /// Creates a reply for `room_id`.
    pub fn new(room_id: impl Into<String>, message: impl Into<String>) -> Self {
        BotReply {
            room_id: room_id.into(),
            message: message.into(),
        }
    }

    /// Creates the generic error reply for `room_id`.
    pub fn bot_error(room_id: impl Into<String>) -> Self {
        Self::new(room_id, BOT_ERROR_MESSAGE)
    }

    /// Encode the reply to JSON bytes.
    pub fn to_json_bytes(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Wire bytes published to the chat queue, `roomId` first.
    ///
    /// Serializing a struct of two `String` fields into memory cannot fail, so the
    /// empty fallback is never taken.
    pub fn encode(&self) -> Vec<u8> {
        self.to_json_bytes().unwrap_or_default()
    }

    /// Decode a reply read back from the chat queue.
    pub fn from_json_bytes(raw: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(raw)?)
    }
}
