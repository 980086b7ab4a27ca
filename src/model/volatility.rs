//! Historical volatility estimation
//!
//! Annualized close-to-close volatility from a daily price series

use crate::config::VolatilityConfig;
use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons an estimate was discarded in favor of the default
#[derive(Debug, Error)]
pub enum VolatilityError {
    /// Not enough raw prices or valid returns
    #[error("insufficient data: {prices} prices, {returns} valid returns")]
    InsufficientData { prices: usize, returns: usize },
    /// Estimate fell outside the sanity band
    #[error("estimate out of range: {annualized}")]
    OutOfRange { annualized: Decimal },
}

/// Close-to-close volatility estimator over a daily series
pub struct HistoricalVolEstimator {
    min_prices: usize,
    min_returns: usize,
    min_annualized: Decimal,
    max_annualized: Decimal,
    trading_days_per_year: u32,
}

impl HistoricalVolEstimator {
    /// Create an estimator from config
    pub fn new(config: &VolatilityConfig, trading_days_per_year: u32) -> Self {
        Self {
            min_prices: config.min_prices,
            min_returns: config.min_returns,
            min_annualized: config.min_annualized,
            max_annualized: config.max_annualized,
            trading_days_per_year,
        }
    }

    /// Estimate annualized volatility from a close series
    ///
    /// The series may contain gaps; a return is formed only from adjacent
    /// entries that are both present and positive. Sample variance uses the
    /// (n-1) denominator.
    pub fn estimate(&self, closes: &[Option<Decimal>]) -> Result<Decimal, VolatilityError> {
        let mut returns: Vec<f64> = Vec::new();

        for pair in closes.windows(2) {
            if let (Some(prev), Some(curr)) = (pair[0], pair[1]) {
                if prev > Decimal::ZERO && curr > Decimal::ZERO {
                    let prev_f: f64 = prev.try_into().unwrap_or(0.0);
                    let curr_f: f64 = curr.try_into().unwrap_or(0.0);
                    if prev_f > 0.0 {
                        returns.push((curr_f - prev_f) / prev_f);
                    }
                }
            }
        }

        if closes.len() < self.min_prices || returns.len() < self.min_returns {
            return Err(VolatilityError::InsufficientData {
                prices: closes.len(),
                returns: returns.len(),
            });
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let daily_vol = variance.sqrt();
        let annualized = daily_vol * (self.trading_days_per_year as f64).sqrt();

        let annualized = Decimal::try_from(annualized).unwrap_or(Decimal::ZERO);
        if annualized < self.min_annualized || annualized > self.max_annualized {
            return Err(VolatilityError::OutOfRange { annualized });
        }

        Ok(annualized)
    }

    /// Estimate with fallback to the instrument default
    ///
    /// Fallbacks are logged at warn level and never propagate.
    pub fn estimate_or(
        &self,
        closes: &[Option<Decimal>],
        default: Decimal,
        ticker: &str,
    ) -> Decimal {
        match self.estimate(closes) {
            Ok(vol) => {
                tracing::debug!(ticker = %ticker, volatility = %vol, "estimated volatility");
                vol
            }
            Err(e) => {
                tracing::warn!(
                    ticker = %ticker,
                    default = %default,
                    reason = %e,
                    "using default volatility"
                );
                default
            }
        }
    }
}
