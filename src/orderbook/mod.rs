//! Order book module
//!
//! Book containers, best bid/ask analysis, and the CLOB REST client

mod book;
mod clob;

pub use book::{BookSummary, OrderBook};
pub use clob::ClobClient;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price level in the order book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Price at this level
    pub price: Decimal,
    /// Total size available
    pub size: Decimal,
}
