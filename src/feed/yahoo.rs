//! Yahoo Finance chart client
//!
//! Fetches three months of daily candles per ticker. Quotes are cached for a
//! few minutes so repeated refresh cycles do not hammer the endpoint.

use super::StockQuote;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

/// Client for the Yahoo Finance chart API
pub struct YahooClient {
    base_url: String,
    client: Client,
    cache_ttl: ChronoDuration,
    cache: Mutex<HashMap<String, StockQuote>>,
}

impl YahooClient {
    /// Create a new chart client
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        cache_ttl_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
            cache_ttl: ChronoDuration::seconds(cache_ttl_secs as i64),
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Fetch a quote with its close history, serving from cache when fresh
    pub async fn fetch_quote(&self, ticker: &str) -> anyhow::Result<StockQuote> {
        {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.get(ticker) {
                if Utc::now() - cached.fetched_at < self.cache_ttl {
                    tracing::debug!(ticker = %ticker, "Serving cached quote");
                    return Ok(cached.clone());
                }
            }
        }

        let url = format!("{}/{}", self.base_url, ticker);

        tracing::debug!(ticker = %ticker, "Fetching quote from Yahoo chart API");

        let response = self
            .client
            .get(&url)
            .query(&[("interval", "1d"), ("range", "3mo")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Yahoo chart API error: {} - {}", status, body);
        }

        let chart: ChartResponse = response.json().await?;
        let quote = chart_to_quote(chart);

        let mut cache = self.cache.lock().await;
        cache.insert(ticker.to_string(), quote.clone());

        Ok(quote)
    }
}

/// Chart response envelope
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

fn chart_to_quote(chart: ChartResponse) -> StockQuote {
    let Some(result) = chart.chart.result.and_then(|r| r.into_iter().next()) else {
        return StockQuote::unavailable();
    };

    let price = result
        .meta
        .regular_market_price
        .and_then(|p| Decimal::try_from(p).ok());

    let closes = result
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .map(|q| {
            q.close
                .into_iter()
                .map(|c| c.and_then(|v| Decimal::try_from(v).ok()))
                .collect()
        })
        .unwrap_or_default();

    StockQuote {
        price,
        closes,
        fetched_at: Utc::now(),
    }
}
