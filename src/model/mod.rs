//! Pricing model module
//!
//! Fair value for binary above/below contracts plus historical volatility

mod binary;
mod volatility;

pub use binary::{norm_cdf, time_to_expiry_years, BinaryCallModel};
pub use volatility::{HistoricalVolEstimator, VolatilityError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-instrument pricing state for one refresh cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// Current spot price
    pub current_price: Decimal,
    /// Annualized volatility (estimated or default)
    pub volatility: Decimal,
    /// Continuous dividend yield
    pub dividend_yield: Decimal,
    /// Annualized risk-free rate
    pub risk_free_rate: Decimal,
    /// Trading-day time to resolution, in years
    pub time_to_expiry_years: f64,
}

/// Calculated fair value for a binary contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairValue {
    /// Discounted fair price of the YES side
    pub fair_value: Decimal,
    /// Risk-neutral probability of the YES outcome
    pub probability: Decimal,
}

/// Trait for fair value model implementations
pub trait FairValueModel: Send + Sync {
    /// Calculate fair value for a strike against the current snapshot
    fn calculate(&self, strike: Decimal, snapshot: &StockSnapshot) -> FairValue;
}
