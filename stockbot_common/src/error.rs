//! Error types shared between the worker and the client.
//!
//! The `StockBotError` enum covers the request-level failures the message pipeline
//! resolves on its own (`InvalidRequest`, `FetchFailed`, `MalformedResponse`) and the
//! transport-level failures the connection supervisor retries (`TransportFault`).
use thiserror::Error;

/// Unified error type shared by the worker and the client.
#[derive(Error, Debug)]
pub enum StockBotError {
    /// The inbound payload was empty or could not be parsed.
    ///
    /// `room_id` is the room resolved before the failure, or the default room when
    /// decoding failed before a room could be read.
    #[error("Invalid request for room {room_id}: {reason}")]
    InvalidRequest {
        /// Room the error reply should be addressed to.
        room_id: String,
        /// Human-readable cause.
        reason: String,
    },

    /// The quote provider could not be reached, timed out, or answered with an error status.
    #[error("Quote fetch failed: {0}")]
    FetchFailed(String),

    /// The quote provider answered with a payload of unexpected shape.
    #[error("Malformed quote response: {0}")]
    MalformedResponse(String),

    /// Broker connection, channel, or consumer failure.
    #[error("Transport fault: {0}")]
    TransportFault(String),

    /// Invalid process configuration detected at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl StockBotError {
    /// Builds an `InvalidRequest` addressed to `room_id`.
    pub fn invalid_request(room_id: impl Into<String>, reason: impl Into<String>) -> Self {
        StockBotError::InvalidRequest {
            room_id: room_id.into(),
            reason: reason.into(),
        }
    }

    /// Room resolved before the failure, for errors raised while decoding a request.
    pub fn room_id(&self) -> Option<&str> {
        match self {
            StockBotError::InvalidRequest { room_id, .. } => Some(room_id.as_str()),
            _ => None,
        }
    }
}

impl From<lapin::Error> for StockBotError {
    fn from(err: lapin::Error) -> Self {
        StockBotError::TransportFault(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_invalid_requests_carry_a_room() {
        assert_eq!(StockBotError::invalid_request("traders", "missing stock code").room_id(), Some("traders"));
        assert_eq!(StockBotError::FetchFailed("timeout".to_string()).room_id(), None);
        assert_eq!(StockBotError::TransportFault("closed".to_string()).room_id(), None);
    }
}
