//! Scanner output types

use crate::config::InstrumentConfig;
use crate::market::MarketContract;
use crate::model::{FairValue, StockSnapshot};
use crate::orderbook::BookSummary;
use crate::scanner::changes::ChangeSet;
use crate::scanner::rank::SideMetrics;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of a binary contract to take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy the YES token at the ask
    Yes,
    /// Buy NO against the current best bid
    No,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Yes => write!(f, "YES"),
            Side::No => write!(f, "NO"),
        }
    }
}

/// Key identifying an opportunity row across refresh cycles
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OpportunityKey {
    pub ticker: String,
    pub strike_price: Decimal,
}

impl std::fmt::Display for OpportunityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.ticker, self.strike_price)
    }
}

/// A ranked opportunity, rebuilt fully each refresh cycle
#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    /// Instrument ticker
    pub ticker: String,
    /// Contract strike
    pub strike_price: Decimal,
    /// Chosen side (YES tie-break)
    pub side: Side,
    /// Headline return on a $1 stake
    pub roi: Decimal,
    /// Raw Kelly fraction; clamp only for display
    pub kelly_fraction: Decimal,
    /// Model probability of YES
    pub probability: Decimal,
    /// Discounted fair value of YES
    pub fair_value: Decimal,
    /// Best ask for the YES token
    pub best_ask: Decimal,
    /// Best bid for the YES token
    pub best_bid: Decimal,
    /// Cost of taking NO against the best bid
    pub buy_no_price: Decimal,
    /// Fair value minus best ask
    pub edge_vs_ask: Decimal,
    /// NO-side fair price minus NO cost
    pub edge_vs_bid: Decimal,
    /// Market-implied YES probability, when published
    pub market_yes: Option<Decimal>,
}

impl Opportunity {
    /// Cross-cycle identity of this row
    pub fn key(&self) -> OpportunityKey {
        OpportunityKey {
            ticker: self.ticker.clone(),
            strike_price: self.strike_price,
        }
    }

    /// Kelly percentage clamped to [0, 100] for display
    pub fn display_kelly_pct(&self) -> Decimal {
        (self.kelly_fraction * Decimal::ONE_HUNDRED).min(Decimal::ONE_HUNDRED)
    }
}

/// One contract row in an instrument view
#[derive(Debug, Clone)]
pub struct ContractRow {
    pub contract: MarketContract,
    /// Model output; absent without a usable strike
    pub fair: Option<FairValue>,
    /// Book analysis; absent when the book fetch failed
    pub book: Option<BookSummary>,
    /// Fair value minus best ask
    pub edge_vs_ask: Option<Decimal>,
    /// Fair value minus best bid
    pub edge_vs_bid: Option<Decimal>,
    /// Per-side ROI/Kelly and the selected headline
    pub metrics: SideMetrics,
}

/// All contracts of one instrument, sorted by strike
#[derive(Debug, Clone)]
pub struct InstrumentView {
    pub instrument: InstrumentConfig,
    pub title: String,
    pub snapshot: StockSnapshot,
    pub rows: Vec<ContractRow>,
}

/// Full output of one refresh cycle
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub refreshed_at: DateTime<Utc>,
    pub instruments: Vec<InstrumentView>,
    pub opportunities: Vec<Opportunity>,
    pub changes: ChangeSet,
}

impl Dashboard {
    /// Look up an instrument view by ticker
    pub fn instrument(&self, ticker: &str) -> Option<&InstrumentView> {
        self.instruments
            .iter()
            .find(|v| v.instrument.ticker.eq_ignore_ascii_case(ticker))
    }
}
