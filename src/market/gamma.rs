//! Gamma API client for event discovery
//!
//! Fetches an instrument's above/below event by slug and normalizes its
//! markets into contracts. One malformed market field never drops the event;
//! the field is treated as absent and the contract keeps reduced data.

use super::{extract_strike_price, EventSnapshot, MarketContract, StringOrArray};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Client for Polymarket's Gamma API
pub struct GammaClient {
    base_url: String,
    client: Client,
}

impl GammaClient {
    /// Create a new Gamma API client
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Fetch an event by slug
    ///
    /// Returns None when the slug matches nothing.
    pub async fn fetch_event(&self, slug: &str) -> anyhow::Result<Option<EventSnapshot>> {
        let url = format!("{}/events", self.base_url);

        tracing::debug!(slug = %slug, "Fetching event from Gamma API");

        let response = self
            .client
            .get(&url)
            .query(&[("slug", slug)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gamma API error: {} - {}", status, body);
        }

        let events: Vec<GammaEvent> = response.json().await?;

        let Some(event) = events.into_iter().next() else {
            return Ok(None);
        };

        let contracts: Vec<MarketContract> =
            event.markets.into_iter().map(convert_market).collect();

        tracing::debug!(
            slug = %slug,
            contract_count = contracts.len(),
            "Normalized event markets"
        );

        Ok(Some(EventSnapshot {
            slug: slug.to_string(),
            title: event.title.unwrap_or_else(|| slug.to_string()),
            contracts,
        }))
    }
}

/// Event response from the Gamma API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GammaEvent {
    /// Event title
    title: Option<String>,
    /// Markets within this event
    #[serde(default)]
    markets: Vec<GammaMarket>,
}

/// Raw market within an event
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GammaMarket {
    /// Market question
    question: Option<String>,
    /// Outcome prices, string-encoded or an actual array
    outcome_prices: Option<StringOrArray>,
    /// CLOB token IDs, string-encoded or an actual array; first is YES
    clob_token_ids: Option<StringOrArray>,
}

/// Convert a raw Gamma market to a normalized contract
fn convert_market(market: GammaMarket) -> MarketContract {
    let question = market.question.unwrap_or_else(|| "Unknown".to_string());
    let strike_price = extract_strike_price(&question);

    let prices = market
        .outcome_prices
        .and_then(StringOrArray::into_vec)
        .unwrap_or_default();
    let yes_probability = prices.first().and_then(|p| Decimal::from_str(p).ok());
    let no_probability = prices.get(1).and_then(|p| Decimal::from_str(p).ok());

    let yes_token_id = market
        .clob_token_ids
        .and_then(StringOrArray::into_vec)
        .and_then(|tokens| tokens.into_iter().next());

    MarketContract {
        question,
        strike_price,
        yes_probability,
        no_probability,
        yes_token_id,
    }
}
