//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `StockBotError`, so functions can simply return `Result<T>`.
use crate::error::StockBotError;

/// Workspace-wide `Result` alias with `StockBotError` as the default error.
pub type Result<T, E = StockBotError> = std::result::Result<T, E>;
