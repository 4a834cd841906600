//! Command-line arguments for the stock bot client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use stockbot_common::StockRequest;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Stock symbol to request (e.g., `aapl.us`).
    #[clap(long)]
    pub symbol: String,

    /// Chat room the reply should be addressed to. Defaults to `general` on the worker.
    #[clap(long, conflicts_with = "raw")]
    pub room: Option<String>,

    /// Publish the bare symbol instead of a JSON request. The worker answers a bare
    /// symbol in `general`.
    #[clap(long)]
    pub raw: bool,

    /// Seconds to wait for the reply before giving up.
    #[clap(long, default_value_t = 15)]
    pub wait_secs: u64,
}

impl Args {
    /// Request to publish. A raw request cannot carry a room, so its reply is awaited in
    /// the default room.
    pub fn request(&self) -> StockRequest {
        let room = if self.raw { None } else { self.room.as_deref() };
        StockRequest::new(&self.symbol, room)
    }
}
