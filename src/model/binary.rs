//! Binary option fair value model
//!
//! Digital call under risk-neutral pricing:
//! P(S_T > K) = N(d2) where d2 = (ln(S/K) + (r - q - sigma^2/2)*T) / (sigma*sqrt(T)),
//! fair value = e^(-rT) * N(d2)

use super::{FairValue, FairValueModel, StockSnapshot};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Floor applied when volatility collapses to zero
const MIN_SIGMA: f64 = 0.001;

/// Smallest time to expiry, in years
const MIN_TIME_YEARS: f64 = 0.001;

/// Black-Scholes-style binary call model
pub struct BinaryCallModel;

impl BinaryCallModel {
    /// Create a new binary call model
    pub fn new() -> Self {
        Self
    }
}

impl Default for BinaryCallModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FairValueModel for BinaryCallModel {
    fn calculate(&self, strike: Decimal, snapshot: &StockSnapshot) -> FairValue {
        let s: f64 = snapshot.current_price.try_into().unwrap_or(0.0);
        let k: f64 = strike.try_into().unwrap_or(0.0);
        let r: f64 = snapshot.risk_free_rate.try_into().unwrap_or(0.0);
        let sigma: f64 = snapshot.volatility.try_into().unwrap_or(0.0);
        let q: f64 = snapshot.dividend_yield.try_into().unwrap_or(0.0);

        let (fair_value, probability) =
            binary_call(s, k, snapshot.time_to_expiry_years, r, sigma, q);

        FairValue {
            fair_value: Decimal::try_from(fair_value).unwrap_or(Decimal::ZERO),
            probability: Decimal::try_from(probability).unwrap_or(Decimal::ZERO),
        }
    }
}

/// Price a binary call in raw float terms
///
/// Returns `(fair_value, probability)`. At or past expiry the outcome is the
/// indicator 1{S > K}; zero volatility is floored rather than rejected.
pub fn binary_call(s: f64, k: f64, t: f64, r: f64, sigma: f64, q: f64) -> (f64, f64) {
    if t <= 0.0 {
        let prob = if s > k { 1.0 } else { 0.0 };
        return (prob, prob);
    }

    let sigma = if sigma <= 0.0 { MIN_SIGMA } else { sigma };

    let d2 = ((s / k).ln() + (r - q - 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
    let probability = norm_cdf(d2);
    let fair_value = (-r * t).exp() * probability;

    (fair_value, probability)
}

/// Standard normal CDF approximation (Abramowitz and Stegun)
pub fn norm_cdf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs() / std::f64::consts::SQRT_2;

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    0.5 * (1.0 + sign * y)
}

/// Trading-day time to expiry in years
///
/// Calendar days scaled by 5/7 to approximate the trading calendar, floored at
/// a small positive epsilon so expired markets never produce T <= 0 downstream.
pub fn time_to_expiry_years(
    resolution_date: DateTime<Utc>,
    now: DateTime<Utc>,
    trading_days_per_year: u32,
) -> f64 {
    let calendar_days = (resolution_date - now).num_seconds() as f64 / 86_400.0;
    let trading_days = calendar_days * (5.0 / 7.0);
    (trading_days / trading_days_per_year as f64).max(MIN_TIME_YEARS)
}
