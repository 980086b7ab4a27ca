//! Refresh engine
//!
//! Fans out per-instrument fetches, joins them into a fully resolved input
//! set, then runs the pricing and ranking pass. A refresh cycle never mixes
//! inputs with another cycle, and the prior-opportunities snapshot is swapped
//! whole, never patched in place.

mod changes;
mod rank;
mod types;

pub use changes::{detect_changes, ChangeSet, ChangedField, SnapshotEntry};
pub use rank::{evaluate_sides, rank_opportunities, Headline, SideMetrics};
pub use types::{ContractRow, Dashboard, InstrumentView, Opportunity, OpportunityKey, Side};

use crate::config::{ApiConfig, Config, InstrumentConfig};
use crate::feed::{StockQuote, YahooClient};
use crate::market::{EventSnapshot, GammaClient, MarketContract};
use crate::model::{
    time_to_expiry_years, BinaryCallModel, FairValueModel, HistoricalVolEstimator, StockSnapshot,
};
use crate::orderbook::{ClobClient, OrderBook};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// Source of per-instrument market data for one refresh cycle
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Spot price and close history for an instrument
    async fn stock_quote(&self, instrument: &InstrumentConfig) -> anyhow::Result<StockQuote>;
    /// The instrument's above/below event with its contracts
    async fn event(&self, instrument: &InstrumentConfig) -> anyhow::Result<Option<EventSnapshot>>;
    /// Order book for a contract's YES token
    async fn order_book(&self, token_id: &str) -> anyhow::Result<OrderBook>;
}

/// Live source backed by the Yahoo, Gamma, and CLOB clients
pub struct LiveMarketData {
    yahoo: YahooClient,
    gamma: GammaClient,
    clob: ClobClient,
}

impl LiveMarketData {
    /// Build clients from the API config
    pub fn new(api: &ApiConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(api.timeout_secs);
        Ok(Self {
            yahoo: YahooClient::new(&api.yahoo_url, timeout, api.quote_cache_secs)?,
            gamma: GammaClient::new(&api.gamma_url, timeout)?,
            clob: ClobClient::new(&api.clob_url, timeout)?,
        })
    }
}

#[async_trait]
impl MarketDataSource for LiveMarketData {
    async fn stock_quote(&self, instrument: &InstrumentConfig) -> anyhow::Result<StockQuote> {
        self.yahoo.fetch_quote(&instrument.ticker).await
    }

    async fn event(&self, instrument: &InstrumentConfig) -> anyhow::Result<Option<EventSnapshot>> {
        self.gamma.fetch_event(&instrument.slug).await
    }

    async fn order_book(&self, token_id: &str) -> anyhow::Result<OrderBook> {
        self.clob.fetch_book(token_id).await
    }
}

/// Fully resolved inputs for one refresh cycle
#[derive(Debug, Clone)]
pub struct CycleInputs {
    pub refreshed_at: DateTime<Utc>,
    pub instruments: Vec<InstrumentInputs>,
}

/// One instrument's resolved inputs
#[derive(Debug, Clone)]
pub struct InstrumentInputs {
    pub instrument: InstrumentConfig,
    pub snapshot: StockSnapshot,
    pub title: String,
    pub contracts: Vec<ContractInputs>,
}

/// One contract with its fetched book, if any
#[derive(Debug, Clone)]
pub struct ContractInputs {
    pub contract: MarketContract,
    pub book: Option<OrderBook>,
}

/// The refresh engine
///
/// Holds the only cross-cycle state: the previous ranked snapshot for change
/// detection and the busy flag rejecting overlapping refreshes.
pub struct Scanner<D> {
    config: Config,
    source: D,
    model: BinaryCallModel,
    estimator: HistoricalVolEstimator,
    previous: Mutex<Option<Vec<SnapshotEntry>>>,
    busy: AtomicBool,
}

impl<D: MarketDataSource> Scanner<D> {
    /// Create a scanner over a data source
    pub fn new(config: Config, source: D) -> Self {
        let estimator = HistoricalVolEstimator::new(
            &config.volatility,
            config.pricing.trading_days_per_year,
        );
        Self {
            config,
            source,
            model: BinaryCallModel::new(),
            estimator,
            previous: Mutex::new(None),
            busy: AtomicBool::new(false),
        }
    }

    /// Run one refresh cycle
    ///
    /// Returns None without doing any work when a cycle is already in flight;
    /// overlapping refreshes would corrupt the change-detection snapshot.
    pub async fn try_refresh(&self) -> anyhow::Result<Option<Dashboard>> {
        if self.busy.swap(true, Ordering::SeqCst) {
            tracing::warn!("refresh already in progress, skipping");
            return Ok(None);
        }

        let result = self.refresh_cycle(Utc::now()).await;
        self.busy.store(false, Ordering::SeqCst);
        result.map(Some)
    }

    async fn refresh_cycle(&self, now: DateTime<Utc>) -> anyhow::Result<Dashboard> {
        tracing::info!(
            instruments = self.config.instruments.len(),
            "starting refresh cycle"
        );

        let fetches = self
            .config
            .instruments
            .iter()
            .map(|instrument| self.fetch_instrument(instrument, now));
        let resolved: Vec<Option<InstrumentInputs>> = join_all(fetches).await;

        let inputs = CycleInputs {
            refreshed_at: now,
            instruments: resolved.into_iter().flatten().collect(),
        };

        let mut dashboard = analyze_cycle(inputs, &self.model, self.config.scanner.top_n);

        let mut previous = self.previous.lock().await;
        dashboard.changes = detect_changes(previous.as_deref(), &dashboard.opportunities);
        *previous = Some(
            dashboard
                .opportunities
                .iter()
                .map(SnapshotEntry::from)
                .collect(),
        );

        tracing::info!(
            instruments = dashboard.instruments.len(),
            opportunities = dashboard.opportunities.len(),
            new = dashboard.changes.new_rows.len(),
            changed = dashboard.changes.changed_rows.len(),
            "refresh cycle complete"
        );

        Ok(dashboard)
    }

    /// Resolve one instrument's inputs, degrading on partial failure
    ///
    /// A failed event fetch drops the instrument for this cycle; a failed
    /// quote or book fetch degrades that piece to defaults/absent.
    async fn fetch_instrument(
        &self,
        instrument: &InstrumentConfig,
        now: DateTime<Utc>,
    ) -> Option<InstrumentInputs> {
        let (quote, event) = tokio::join!(
            self.source.stock_quote(instrument),
            self.source.event(instrument)
        );

        let event = match event {
            Ok(Some(event)) => event,
            Ok(None) => {
                tracing::warn!(ticker = %instrument.ticker, slug = %instrument.slug, "no event data");
                return None;
            }
            Err(e) => {
                tracing::warn!(ticker = %instrument.ticker, error = %e, "event fetch failed");
                return None;
            }
        };

        let quote = quote.unwrap_or_else(|e| {
            tracing::warn!(
                ticker = %instrument.ticker,
                error = %e,
                "quote fetch failed, using defaults"
            );
            StockQuote::unavailable()
        });

        let snapshot = self.build_snapshot(instrument, &quote, now);

        let books = join_all(event.contracts.iter().map(|contract| async {
            let token_id = contract.yes_token_id.as_deref()?;
            match self.source.order_book(token_id).await {
                Ok(book) => Some(book),
                Err(e) => {
                    tracing::warn!(token_id = %token_id, error = %e, "order book fetch failed");
                    None
                }
            }
        }))
        .await;

        let contracts = event
            .contracts
            .into_iter()
            .zip(books)
            .map(|(contract, book)| ContractInputs { contract, book })
            .collect();

        Some(InstrumentInputs {
            instrument: instrument.clone(),
            snapshot,
            title: event.title,
            contracts,
        })
    }

    fn build_snapshot(
        &self,
        instrument: &InstrumentConfig,
        quote: &StockQuote,
        now: DateTime<Utc>,
    ) -> StockSnapshot {
        let volatility = self.estimator.estimate_or(
            &quote.closes,
            instrument.default_volatility,
            &instrument.ticker,
        );
        let current_price = quote
            .price
            .filter(|p| *p > Decimal::ZERO)
            .unwrap_or(instrument.default_price);

        StockSnapshot {
            current_price,
            volatility,
            dividend_yield: instrument.dividend_yield,
            risk_free_rate: self.config.pricing.risk_free_rate,
            time_to_expiry_years: time_to_expiry_years(
                self.config.pricing.resolution_date,
                now,
                self.config.pricing.trading_days_per_year,
            ),
        }
    }
}

/// Run the pricing and ranking pass over resolved inputs
///
/// Pure: deterministic for a given input set, no I/O. Change detection is the
/// caller's concern since it needs the retained prior snapshot.
pub fn analyze_cycle<M: FairValueModel>(
    inputs: CycleInputs,
    model: &M,
    top_n: usize,
) -> Dashboard {
    let mut views = Vec::with_capacity(inputs.instruments.len());

    for instrument_inputs in inputs.instruments {
        let snapshot = instrument_inputs.snapshot;
        let mut rows: Vec<ContractRow> = instrument_inputs
            .contracts
            .into_iter()
            .map(|ci| {
                let fair = ci
                    .contract
                    .strike_price
                    .filter(|strike| *strike > Decimal::ZERO)
                    .map(|strike| model.calculate(strike, &snapshot));
                let book = ci.book.as_ref().map(|b| b.summarize());

                let edge_vs_ask = fair
                    .as_ref()
                    .zip(book.as_ref())
                    .map(|(f, b)| f.fair_value - b.best_ask);
                let edge_vs_bid = fair
                    .as_ref()
                    .zip(book.as_ref())
                    .map(|(f, b)| f.fair_value - b.best_bid);

                let metrics = evaluate_sides(fair.as_ref(), book.as_ref());

                ContractRow {
                    contract: ci.contract,
                    fair,
                    book,
                    edge_vs_ask,
                    edge_vs_bid,
                    metrics,
                }
            })
            .collect();

        rows.sort_by_key(|row| row.contract.strike_price.unwrap_or_default());

        views.push(InstrumentView {
            instrument: instrument_inputs.instrument,
            title: instrument_inputs.title,
            snapshot,
            rows,
        });
    }

    let opportunities = rank_opportunities(&views, top_n);

    Dashboard {
        refreshed_at: inputs.refreshed_at,
        instruments: views,
        opportunities,
        changes: ChangeSet::default(),
    }
}
