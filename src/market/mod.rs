//! Market contracts module
//!
//! Normalized above/below contracts from Gamma event data

mod gamma;

pub use gamma::GammaClient;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single above/below contract within an instrument's event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketContract {
    /// Question text (e.g. "Will NVDA be above $150 in January 2026?")
    pub question: String,
    /// Strike parsed from the question text
    pub strike_price: Option<Decimal>,
    /// Market-implied YES probability
    pub yes_probability: Option<Decimal>,
    /// Market-implied NO probability
    pub no_probability: Option<Decimal>,
    /// CLOB token id for the YES side
    pub yes_token_id: Option<String>,
}

/// An instrument's event with its contracts
#[derive(Debug, Clone)]
pub struct EventSnapshot {
    /// Event slug
    pub slug: String,
    /// Event title
    pub title: String,
    /// Contracts, one per strike
    pub contracts: Vec<MarketContract>,
}

/// Extract the strike price from free-text question
///
/// Takes the first numeric token, optionally $-prefixed, with thousands
/// separators stripped. Returns None when the question carries no number.
pub fn extract_strike_price(question: &str) -> Option<Decimal> {
    lazy_static! {
        static ref STRIKE_RE: Regex =
            Regex::new(r"\$?([0-9][0-9,]*(?:\.[0-9]+)?)").expect("valid strike regex");
    }

    let caps = STRIKE_RE.captures(question)?;
    let cleaned = caps[1].replace(',', "");
    Decimal::from_str(&cleaned).ok()
}

/// JSON fields that arrive either encoded as a string or as a real array
///
/// Gamma serves `outcomePrices` and `clobTokenIds` in both shapes. Everything
/// downstream sees one typed representation; a string that fails to parse
/// means the field is treated as absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrArray {
    Encoded(String),
    Values(Vec<String>),
}

impl StringOrArray {
    /// Normalize to a typed vector
    pub fn into_vec(self) -> Option<Vec<String>> {
        match self {
            StringOrArray::Values(values) => Some(values),
            StringOrArray::Encoded(encoded) => serde_json::from_str(&encoded).ok(),
        }
    }
}
