//! poly-edge: fair-value scanner for Polymarket above/below equity markets
//!
//! This library provides the core components for:
//! - Binary option fair value via a Black-Scholes digital call
//! - Historical volatility estimation from daily closes
//! - Order book best bid/ask analysis from the CLOB API
//! - ROI and Kelly-fraction ranking across tracked instruments
//! - Change detection between refresh cycles
//! - Event/quote fetching from Gamma and Yahoo Finance

pub mod cli;
pub mod config;
pub mod feed;
pub mod market;
pub mod model;
pub mod orderbook;
pub mod scanner;
pub mod telemetry;
