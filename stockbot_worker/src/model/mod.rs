//! Domain models for the stock bot worker.
//!
//! - `quote` — normalized `Quote` parsed from the provider's CSV payload, and the chat
//!   text it renders to.

pub mod quote;
