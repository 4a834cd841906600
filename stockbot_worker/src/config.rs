//! Worker configuration, read once at startup and passed down explicitly.
use std::time::Duration;

use stockbot_common::{BrokerConfig, Result, StockBotError};

use crate::fetcher::SYMBOL_PLACEHOLDER;

/// Quote URL template variable.
pub const QUOTE_URL_VAR: &str = "STOCKBOT_QUOTE_URL";
/// Fetch timeout variable, in seconds.
pub const FETCH_TIMEOUT_VAR: &str = "STOCKBOT_FETCH_TIMEOUT_SECS";
/// Reconnect backoff variable, in seconds.
pub const RETRY_BACKOFF_VAR: &str = "STOCKBOT_RETRY_BACKOFF_SECS";

/// Default provider endpoint.
pub const DEFAULT_QUOTE_URL: &str = "https://stooq.com/q/l/?s={symbol}&f=sd2t2ohlcv&h&e=csv";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RETRY_BACKOFF_SECS: u64 = 3;

/// Everything the worker needs to run.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Broker connection settings.
    pub broker: BrokerConfig,
    /// Provider URL containing the `{symbol}` placeholder.
    pub quote_url_template: String,
    /// Upper bound on one provider request.
    pub fetch_timeout: Duration,
    /// Delay between failed broker sessions.
    pub retry_backoff: Duration,
}

impl WorkerConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset or blank values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let broker = BrokerConfig::from_lookup(&lookup)?;
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let quote_url_template = read(QUOTE_URL_VAR).unwrap_or_else(|| DEFAULT_QUOTE_URL.to_string());
        if !quote_url_template.contains(SYMBOL_PLACEHOLDER) {
            return Err(StockBotError::Config(format!(
                "{QUOTE_URL_VAR} must contain {SYMBOL_PLACEHOLDER}"
            )));
        }

        let seconds = |key: &str, default: u64| -> Result<Duration> {
            match read(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map(Duration::from_secs)
                    .map_err(|e| StockBotError::Config(format!("{key}={raw}: {e}"))),
                None => Ok(Duration::from_secs(default)),
            }
        };

        Ok(WorkerConfig {
            broker,
            quote_url_template,
            fetch_timeout: seconds(FETCH_TIMEOUT_VAR, DEFAULT_FETCH_TIMEOUT_SECS)?,
            retry_backoff: seconds(RETRY_BACKOFF_VAR, DEFAULT_RETRY_BACKOFF_SECS)?,
        })
    }
}
