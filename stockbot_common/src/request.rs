//! Inbound stock request payload.
//!
//! A request body is either a JSON object `{"stockCode": "...", "roomId": "..."}` with
//! field names matched case-insensitively, or a bare symbol such as `aapl.us`. Only bodies
//! whose first byte is `{` are parsed as JSON; anything else is taken as the symbol.
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StockBotError;
use crate::net::{DEFAULT_ROOM, OBJECT_MARKER, ROOM_ID_FIELD, STOCK_CODE_FIELD};
use crate::result::Result;

/// A decoded request for a single quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockRequest {
    /// Trimmed, non-empty symbol as sent by the user (e.g., `aapl.us`).
    #[serde(rename = "stockCode")]
    pub symbol: String,
    /// Room the reply is addressed to.
    #[serde(rename = "roomId")]
    pub room_id: String,
}

impl StockRequest {
    /// Creates a request, trimming both fields and defaulting a blank room.
    pub fn new(symbol: &str, room_id: Option<&str>) -> Self {
        StockRequest {
            symbol: symbol.trim().to_string(),
            room_id: resolve_room(room_id),
        }
    }

    /// Decodes a raw message body.
    ///
    /// Fails with `InvalidRequest` when the body is a malformed JSON object or when the
    /// symbol is empty after trimming. The error carries the room that was resolved
    /// before the failure so the caller can still address its reply.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let payload = String::from_utf8_lossy(raw);
        if payload.starts_with(OBJECT_MARKER) {
            return Self::decode_structured(&payload);
        }

        let symbol = payload.trim();
        if symbol.is_empty() {
            return Err(StockBotError::invalid_request(DEFAULT_ROOM, "missing stock code"));
        }
        Ok(StockRequest::new(symbol, None))
    }

    fn decode_structured(payload: &str) -> Result<Self> {
        let fields: Map<String, Value> = serde_json::from_str(payload).map_err(|e| {
            StockBotError::invalid_request(DEFAULT_ROOM, format!("malformed request: {e}"))
        })?;

        let stock_code = text_field(&fields, STOCK_CODE_FIELD)?;
        let room_id = resolve_room(text_field(&fields, ROOM_ID_FIELD)?);

        let symbol = stock_code.unwrap_or_default().trim();
        if symbol.is_empty() {
            return Err(StockBotError::invalid_request(room_id, "missing stock code"));
        }
        Ok(StockRequest {
            symbol: symbol.to_string(),
            room_id,
        })
    }

    /// Encode the request as a structured JSON body.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Looks up a string field by case-insensitive name. When several keys match, the last
/// one wins. `null` reads as absent; any other non-string value is a type error.
fn text_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Result<Option<&'a str>> {
    let value = fields
        .iter()
        .filter(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
        .last();

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(other) => Err(StockBotError::invalid_request(
            DEFAULT_ROOM,
            format!("field {name} must be a string, got {other}"),
        )),
    }
}

fn resolve_room(room_id: Option<&str>) -> String {
    room_id
        .map(str::trim)
        .filter(|room| !room.is_empty())
        .unwrap_or(DEFAULT_ROOM)
        .to_string()
}
