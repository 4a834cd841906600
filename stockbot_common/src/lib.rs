//!
//! Common types and utilities shared by the stock bot worker and client.
//!
//! This crate aggregates:
//! - `error` — unified error type `StockBotError` used across the workspace.
//! - `result` — handy `Result<T, StockBotError>` alias.
//! - `request` — inbound `StockRequest` payload and its tolerant decoder.
//! - `reply` — outbound `BotReply` payload and its wire encoding.
//! - `amqp` — connection and queue declaration helpers.
//! - `config` — broker connection settings read from the environment.
//! - `net` — queue names and wire constants.
#![warn(missing_docs)]
pub mod amqp;
pub mod config;
pub mod error;
pub mod net;
pub mod reply;
pub mod request;
pub mod result;

pub use config::BrokerConfig;
pub use error::StockBotError;
pub use reply::BotReply;
pub use request::StockRequest;
pub use result::Result;
