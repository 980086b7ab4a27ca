//! Configuration types for poly-edge

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pricing: PricingConfig,
    #[serde(default)]
    pub volatility: VolatilityConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub telemetry: TelemetryConfig,
    pub instruments: Vec<InstrumentConfig>,
}

/// Pricing model parameters shared by every instrument
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Annualized risk-free rate (e.g. 0.045 for the 1-month T-Bill)
    pub risk_free_rate: Decimal,
    /// Trading days used for annualization and time scaling
    #[serde(default = "default_trading_days")]
    pub trading_days_per_year: u32,
    /// Date the above/below markets resolve (RFC 3339)
    pub resolution_date: DateTime<Utc>,
}

/// Historical volatility estimation parameters
#[derive(Debug, Clone, Deserialize)]
pub struct VolatilityConfig {
    /// Minimum raw close prices before estimating
    #[serde(default = "default_min_prices")]
    pub min_prices: usize,

    /// Minimum valid returns before estimating
    #[serde(default = "default_min_returns")]
    pub min_returns: usize,

    /// Lower sanity bound on the annualized estimate
    #[serde(default = "default_min_annualized")]
    pub min_annualized: Decimal,

    /// Upper sanity bound on the annualized estimate
    #[serde(default = "default_max_annualized")]
    pub max_annualized: Decimal,
}

fn default_trading_days() -> u32 {
    252
}
fn default_min_prices() -> usize {
    20
}
fn default_min_returns() -> usize {
    15
}
fn default_min_annualized() -> Decimal {
    Decimal::new(10, 2) // 0.10
}
fn default_max_annualized() -> Decimal {
    Decimal::new(2, 0)
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            min_prices: 20,
            min_returns: 15,
            min_annualized: Decimal::new(10, 2),
            max_annualized: Decimal::new(2, 0),
        }
    }
}

/// Opportunity scanning configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Number of ranked opportunities to keep
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Auto-refresh interval for `watch`
    #[serde(default = "default_refresh_secs")]
    pub refresh_interval_secs: u64,
}

fn default_top_n() -> usize {
    20
}
fn default_refresh_secs() -> u64 {
    30
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            top_n: 20,
            refresh_interval_secs: 30,
        }
    }
}

/// External API endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_gamma_url")]
    pub gamma_url: String,
    #[serde(default = "default_clob_url")]
    pub clob_url: String,
    #[serde(default = "default_yahoo_url")]
    pub yahoo_url: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How long a fetched stock quote stays fresh
    #[serde(default = "default_quote_cache_secs")]
    pub quote_cache_secs: u64,
}

fn default_gamma_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}
fn default_clob_url() -> String {
    "https://clob.polymarket.com".to_string()
}
fn default_yahoo_url() -> String {
    "https://query1.finance.yahoo.com/v8/finance/chart".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_quote_cache_secs() -> u64 {
    300
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            gamma_url: default_gamma_url(),
            clob_url: default_clob_url(),
            yahoo_url: default_yahoo_url(),
            timeout_secs: 10,
            quote_cache_secs: 300,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// A tracked instrument and its fallback parameters
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentConfig {
    /// Ticker symbol (e.g. "NVDA")
    pub ticker: String,
    /// Display name
    pub name: String,
    /// Gamma event slug (e.g. "nvda-above-in-january-2026")
    pub slug: String,
    /// Continuous dividend yield
    #[serde(default)]
    pub dividend_yield: Decimal,
    /// Volatility used when estimation is infeasible or out of range
    pub default_volatility: Decimal,
    /// Price used when the quote fetch fails
    pub default_price: Decimal,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Find an instrument by ticker (case-insensitive)
    pub fn instrument(&self, ticker: &str) -> Option<&InstrumentConfig> {
        self.instruments
            .iter()
            .find(|i| i.ticker.eq_ignore_ascii_case(ticker))
    }
}
