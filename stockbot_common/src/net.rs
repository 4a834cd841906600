//! Queue names and wire constants shared by the worker and the client.

/// Queue the worker consumes stock requests from.
pub const STOCK_QUEUE: &str = "stockQueue";
/// Queue the worker publishes chat replies to.
pub const CHAT_QUEUE: &str = "chatQueue";
/// Room used when a request does not name one.
pub const DEFAULT_ROOM: &str = "general";
/// Consumer tag the worker registers on `STOCK_QUEUE`.
pub const CONSUMER_TAG: &str = "stockbot";
/// Reply text sent for any request that could not be answered with a quote.
pub const BOT_ERROR_MESSAGE: &str = "bot error: could not fetch quote for requested symbol";
/// Provider marker for a price that is not available.
pub const UNAVAILABLE_SENTINEL: &str = "N/D";
/// First byte of a structured (JSON object) request body.
pub const OBJECT_MARKER: char = '{';
/// Wire name of the stock code field in a structured request.
pub const STOCK_CODE_FIELD: &str = "stockCode";
/// Wire name of the room field in a structured request.
pub const ROOM_ID_FIELD: &str = "roomId";
