//! Quote data model.
//!
//! A `Quote` is what the fetcher hands back to the pipeline: the provider's canonical
//! symbol (upper-cased) and the closing price exactly as the provider wrote it, or a
//! marker that the price is not available.

use stockbot_common::net::UNAVAILABLE_SENTINEL;

/// Closing price of a quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Price {
    /// Price text as returned by the provider (e.g., `185.50`).
    Available(String),
    /// The provider reported the `N/D` sentinel.
    Unavailable,
}

/// Market quote for a single symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Upper-cased symbol (e.g., `AAPL.US`).
    pub symbol: String,
    /// Closing price.
    pub price: Price,
}

impl Quote {
    /// Build a quote from the raw symbol and close columns of a provider row.
    pub fn from_columns(symbol: &str, close: &str) -> Self {
        let price = if close.eq_ignore_ascii_case(UNAVAILABLE_SENTINEL) {
            Price::Unavailable
        } else {
            Price::Available(close.to_string())
        };
        Quote {
            symbol: symbol.to_uppercase(),
            price,
        }
    }

    /// Chat text announcing this quote.
    pub fn reply_text(&self) -> String {
        match &self.price {
            Price::Available(price) => format!("{} quote is ${} per share", self.symbol, price),
            Price::Unavailable => format!("{} quote is not available right now", self.symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_price_is_kept_verbatim() {
        let quote = Quote::from_columns("aapl.us", "185.50");
        assert_eq!(quote.price, Price::Available("185.50".to_string()));
        assert_eq!(quote.reply_text(), "AAPL.US quote is $185.50 per share");
    }

    #[test]
    fn sentinel_matches_any_case() {
        for close in ["N/D", "n/d", "N/d"] {
            let quote = Quote::from_columns("MSFT.US", close);
            assert_eq!(quote.price, Price::Unavailable);
            assert_eq!(quote.reply_text(), "MSFT.US quote is not available right now");
        }
    }
}
