//! Equity quote feed
//!
//! Spot prices and daily close history for volatility estimation

mod yahoo;

pub use yahoo::YahooClient;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A fetched equity quote with its daily close history
#[derive(Debug, Clone)]
pub struct StockQuote {
    /// Last traded price, if the feed had one
    pub price: Option<Decimal>,
    /// Daily closes, oldest first; entries may be missing
    pub closes: Vec<Option<Decimal>>,
    /// Fetch timestamp, used for cache freshness
    pub fetched_at: DateTime<Utc>,
}

impl StockQuote {
    /// Quote for an instrument the feed could not serve
    pub fn unavailable() -> Self {
        Self {
            price: None,
            closes: vec![],
            fetched_at: Utc::now(),
        }
    }
}
