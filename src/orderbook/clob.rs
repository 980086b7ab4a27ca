//! Polymarket CLOB REST client
//!
//! Fetches order book snapshots for a token from the CLOB book endpoint.
//! Level prices and sizes arrive as decimal strings; malformed levels are
//! dropped individually rather than failing the book.

use super::{OrderBook, PriceLevel};
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Client for the Polymarket CLOB REST API
pub struct ClobClient {
    base_url: String,
    client: Client,
}

impl ClobClient {
    /// Create a new CLOB client
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Fetch the order book for a token
    pub async fn fetch_book(&self, token_id: &str) -> anyhow::Result<OrderBook> {
        let url = format!("{}/book", self.base_url);

        tracing::debug!(token_id = %token_id, "Fetching CLOB order book");

        let response = self
            .client
            .get(&url)
            .query(&[("token_id", token_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CLOB API error: {} - {}", status, body);
        }

        let raw: RawBook = response.json().await?;
        Ok(raw_book_to_orderbook(token_id, raw))
    }
}

/// Book response from the CLOB API
#[derive(Debug, Deserialize)]
struct RawBook {
    #[serde(default)]
    bids: Vec<RawLevel>,
    #[serde(default)]
    asks: Vec<RawLevel>,
}

/// Price level with string-encoded decimals
#[derive(Debug, Deserialize)]
struct RawLevel {
    price: String,
    size: String,
}

fn raw_book_to_orderbook(token_id: &str, raw: RawBook) -> OrderBook {
    let parse_levels = |levels: Vec<RawLevel>| -> Vec<PriceLevel> {
        levels
            .into_iter()
            .filter_map(|level| {
                let price = Decimal::from_str(&level.price).ok()?;
                let size = Decimal::from_str(&level.size).ok()?;
                Some(PriceLevel { price, size })
            })
            .collect()
    };

    OrderBook {
        token_id: token_id.to_string(),
        bids: parse_levels(raw.bids),
        asks: parse_levels(raw.asks),
        fetched_at: Utc::now(),
    }
}
