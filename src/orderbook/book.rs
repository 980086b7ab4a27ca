//! Order book state and best bid/ask analysis

use super::PriceLevel;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// L2 aggregated order book for a token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    /// Token identifier
    pub token_id: String,
    /// Bid levels, unsorted on input
    pub bids: Vec<PriceLevel>,
    /// Ask levels, unsorted on input
    pub asks: Vec<PriceLevel>,
    /// Fetch timestamp
    pub fetched_at: DateTime<Utc>,
}

/// Reduced view of one side-pair of books
///
/// An empty bid side prices as worthless (0); an empty ask side prices as
/// certain to resolve at 1. A crossed book yields a negative spread, passed
/// through uncorrected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookSummary {
    /// Highest bid, or 0 with no bids
    pub best_bid: Decimal,
    /// Lowest ask, or 1 with no asks
    pub best_ask: Decimal,
    /// best_ask - best_bid, may be negative
    pub spread: Decimal,
    /// Unweighted sum of bid sizes
    pub total_bid_liquidity: Decimal,
    /// Unweighted sum of ask sizes
    pub total_ask_liquidity: Decimal,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new(token_id: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            bids: vec![],
            asks: vec![],
            fetched_at: Utc::now(),
        }
    }

    /// Reduce the book to best prices and liquidity totals
    pub fn summarize(&self) -> BookSummary {
        let mut bids = self.bids.clone();
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        let mut asks = self.asks.clone();
        asks.sort_by(|a, b| a.price.cmp(&b.price));

        let best_bid = bids.first().map(|l| l.price).unwrap_or(Decimal::ZERO);
        let best_ask = asks.first().map(|l| l.price).unwrap_or(Decimal::ONE);

        BookSummary {
            best_bid,
            best_ask,
            spread: best_ask - best_bid,
            total_bid_liquidity: self.bids.iter().map(|l| l.size).sum(),
            total_ask_liquidity: self.asks.iter().map(|l| l.size).sum(),
        }
    }
}
