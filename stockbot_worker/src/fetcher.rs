//! Quote fetcher backed by the provider's CSV endpoint.
//!
//! One GET per fetch, no retries. The provider answers with a header line followed by a
//! data row; column 0 is the symbol and column 6 the closing price.
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use stockbot_common::{Result, StockBotError};

use crate::model::quote::Quote;

/// Placeholder replaced by the percent-encoded symbol in the URL template.
pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";

const SYMBOL_COLUMN: usize = 0;
const CLOSE_COLUMN: usize = 6;

/// Source of the current quote for a symbol.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current quote for `symbol`.
    async fn fetch(&self, symbol: &str) -> Result<Quote>;
}

/// HTTP implementation of [`QuoteSource`].
pub struct HttpQuoteFetcher {
    client: Client,
    url_template: String,
}

impl HttpQuoteFetcher {
    /// Creates a fetcher whose requests are bounded by `timeout`.
    pub fn new(url_template: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StockBotError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            url_template: url_template.to_string(),
        })
    }

    fn url_for(&self, symbol: &str) -> String {
        self.url_template
            .replace(SYMBOL_PLACEHOLDER, &urlencoding::encode(symbol))
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteFetcher {
    async fn fetch(&self, symbol: &str) -> Result<Quote> {
        let url = self.url_for(symbol);
        debug!("Fetching quote for {} from {}", symbol, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| StockBotError::FetchFailed(format!("{symbol}: {e}")))?;
        let body = response
            .text()
            .await
            .map_err(|e| StockBotError::FetchFailed(format!("{symbol}: {e}")))?;

        parse_quote_csv(&body)
    }
}

/// Parse the provider's CSV payload into a [`Quote`].
///
/// Blank lines are ignored; the first remaining line is the header and the second the
/// data row. Anything shorter is a `MalformedResponse`.
pub fn parse_quote_csv(csv: &str) -> Result<Quote> {
    let mut lines = csv.lines().filter(|line| !line.is_empty());
    let _header = lines.next();
    let row = lines.next().ok_or_else(|| {
        StockBotError::MalformedResponse("CSV response missing data row".to_string())
    })?;

    let columns: Vec<&str> = row.split(',').collect();
    match (columns.get(SYMBOL_COLUMN), columns.get(CLOSE_COLUMN)) {
        (Some(symbol), Some(close)) => Ok(Quote::from_columns(symbol, close)),
        _ => Err(StockBotError::MalformedResponse(format!(
            "expected at least {} columns, got {}: {}",
            CLOSE_COLUMN + 1,
            columns.len(),
            row
        ))),
    }
}
