//! End-to-end pipeline tests
//!
//! Drives the full pricing and ranking pass from resolved inputs, and the
//! scanner refresh cycle through a static data source.

use async_trait::async_trait;
use poly_edge::config::{Config, InstrumentConfig};
use poly_edge::feed::StockQuote;
use poly_edge::market::{EventSnapshot, MarketContract};
use poly_edge::model::{BinaryCallModel, StockSnapshot};
use poly_edge::orderbook::{OrderBook, PriceLevel};
use poly_edge::scanner::{
    analyze_cycle, detect_changes, ContractInputs, CycleInputs, InstrumentInputs,
    MarketDataSource, Scanner, Side, SnapshotEntry,
};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn instrument() -> InstrumentConfig {
    InstrumentConfig {
        ticker: "NVDA".to_string(),
        name: "NVIDIA Corporation".to_string(),
        slug: "nvda-above-in-january-2026".to_string(),
        dividend_yield: Decimal::ZERO,
        default_volatility: dec!(0.45),
        default_price: dec!(135),
    }
}

fn book(bid: Decimal, ask: Decimal) -> OrderBook {
    let mut b = OrderBook::new("yes_tok");
    b.bids = vec![PriceLevel {
        price: bid,
        size: dec!(250),
    }];
    b.asks = vec![PriceLevel {
        price: ask,
        size: dec!(180),
    }];
    b
}

fn contract() -> MarketContract {
    MarketContract {
        question: "Will NVDA be above $210 in January 2026?".to_string(),
        strike_price: Some(dec!(210)),
        yes_probability: Some(dec!(0.32)),
        no_probability: Some(dec!(0.68)),
        yes_token_id: Some("yes_tok".to_string()),
    }
}

fn reference_inputs() -> CycleInputs {
    CycleInputs {
        refreshed_at: Utc::now(),
        instruments: vec![InstrumentInputs {
            instrument: instrument(),
            snapshot: StockSnapshot {
                current_price: dec!(200),
                volatility: dec!(0.3),
                dividend_yield: Decimal::ZERO,
                risk_free_rate: dec!(0.045),
                time_to_expiry_years: 0.25,
            },
            title: "NVDA above in January 2026".to_string(),
            contracts: vec![ContractInputs {
                contract: contract(),
                book: Some(book(dec!(0.25), dec!(0.30))),
            }],
        }],
    }
}

#[test]
fn test_pipeline_reference_values() {
    // Independently computed from the d2/Phi/discount formulas:
    // probability = 0.37248928270975545, fair = 0.3683222617212876
    // roiYes = 0.22774087240429214, kellyYes = 0.10355611815679353
    // roiNo = -0.17267895614673945 -> side YES
    let dashboard = analyze_cycle(reference_inputs(), &BinaryCallModel::new(), 20);

    assert_eq!(dashboard.opportunities.len(), 1);
    let opp = &dashboard.opportunities[0];

    let tol = dec!(0.000001);
    assert_eq!(opp.side, Side::Yes);
    assert!((opp.probability - dec!(0.37248928270975545)).abs() < tol);
    assert!((opp.fair_value - dec!(0.3683222617212876)).abs() < tol);
    assert!((opp.roi - dec!(0.22774087240429214)).abs() < tol);
    assert!((opp.kelly_fraction - dec!(0.10355611815679353)).abs() < tol);
    assert!((opp.edge_vs_ask - dec!(0.06832226172128764)).abs() < tol);

    // The NO side lost the comparison but its inputs are still on the row
    let row = &dashboard.instruments[0].rows[0];
    let roi_no = row.metrics.roi_no.unwrap();
    assert!((roi_no - dec!(-0.17267895614673945)).abs() < tol);
    assert_eq!(row.metrics.kelly_no, Decimal::ZERO);
}

#[test]
fn test_pipeline_change_detection_roundtrip() {
    let first = analyze_cycle(reference_inputs(), &BinaryCallModel::new(), 20);

    // First cycle: nothing to diff against
    let changes = detect_changes(None, &first.opportunities);
    assert!(changes.is_empty());

    let snapshot: Vec<SnapshotEntry> =
        first.opportunities.iter().map(SnapshotEntry::from).collect();

    // Identical second cycle: nothing flagged
    let second = analyze_cycle(reference_inputs(), &BinaryCallModel::new(), 20);
    let changes = detect_changes(Some(&snapshot), &second.opportunities);
    assert!(changes.is_empty());

    // Cheaper ask moves ROI by well over the threshold
    let mut moved_inputs = reference_inputs();
    moved_inputs.instruments[0].contracts[0].book = Some(book(dec!(0.25), dec!(0.28)));
    let third = analyze_cycle(moved_inputs, &BinaryCallModel::new(), 20);
    let changes = detect_changes(Some(&snapshot), &third.opportunities);

    let key = third.opportunities[0].key();
    let fields = changes.changed_rows.get(&key).expect("row should change");
    assert!(!fields.is_empty());
}

/// Static data source for driving the scanner without a network
struct StaticMarketData {
    quote: anyhow::Result<StockQuote>,
    event: anyhow::Result<Option<EventSnapshot>>,
    book: Option<OrderBook>,
}

impl StaticMarketData {
    fn healthy() -> Self {
        Self {
            quote: Ok(StockQuote {
                price: Some(dec!(200)),
                closes: vec![],
                fetched_at: Utc::now(),
            }),
            event: Ok(Some(EventSnapshot {
                slug: "nvda-above-in-january-2026".to_string(),
                title: "NVDA above in January 2026".to_string(),
                contracts: vec![contract()],
            })),
            book: Some(book(dec!(0.25), dec!(0.30))),
        }
    }
}

#[async_trait]
impl MarketDataSource for StaticMarketData {
    async fn stock_quote(&self, _instrument: &InstrumentConfig) -> anyhow::Result<StockQuote> {
        match &self.quote {
            Ok(q) => Ok(q.clone()),
            Err(e) => Err(anyhow::anyhow!("{}", e)),
        }
    }

    async fn event(&self, _instrument: &InstrumentConfig) -> anyhow::Result<Option<EventSnapshot>> {
        match &self.event {
            Ok(e) => Ok(e.clone()),
            Err(e) => Err(anyhow::anyhow!("{}", e)),
        }
    }

    async fn order_book(&self, _token_id: &str) -> anyhow::Result<OrderBook> {
        match &self.book {
            Some(b) => Ok(b.clone()),
            None => Err(anyhow::anyhow!("book unavailable")),
        }
    }
}

fn test_config() -> Config {
    let toml = r#"
        [pricing]
        risk_free_rate = 0.045
        trading_days_per_year = 252
        resolution_date = "2030-01-30T21:00:00Z"

        [telemetry]
        log_level = "info"

        [[instruments]]
        ticker = "NVDA"
        name = "NVIDIA Corporation"
        slug = "nvda-above-in-january-2026"
        dividend_yield = 0.0
        default_volatility = 0.45
        default_price = 135.00
    "#;
    toml::from_str(toml).unwrap()
}

#[tokio::test]
async fn test_scanner_refresh_cycle() {
    let scanner = Scanner::new(test_config(), StaticMarketData::healthy());

    let dashboard = scanner
        .try_refresh()
        .await
        .unwrap()
        .expect("first refresh should run");

    assert_eq!(dashboard.instruments.len(), 1);
    assert_eq!(dashboard.opportunities.len(), 1);

    let opp = &dashboard.opportunities[0];
    assert_eq!(opp.ticker, "NVDA");
    assert_eq!(opp.strike_price, dec!(210));

    // Empty close series -> default volatility flows into the snapshot
    let snapshot = &dashboard.instruments[0].snapshot;
    assert_eq!(snapshot.volatility, dec!(0.45));
    assert_eq!(snapshot.current_price, dec!(200));

    // No prior snapshot: first run carries no markers
    assert!(dashboard.changes.is_empty());
}

#[tokio::test]
async fn test_scanner_second_refresh_diffs_quietly() {
    let scanner = Scanner::new(test_config(), StaticMarketData::healthy());

    let first = scanner.try_refresh().await.unwrap();
    assert!(first.is_some());

    // Busy flag cleared after the first cycle; static data means no deltas
    let second = scanner
        .try_refresh()
        .await
        .unwrap()
        .expect("second refresh should run");
    assert!(second.changes.new_rows.is_empty());
    assert!(second.changes.changed_rows.is_empty());
}

#[tokio::test]
async fn test_scanner_degrades_on_quote_failure() {
    let source = StaticMarketData {
        quote: Err(anyhow::anyhow!("feed down")),
        ..StaticMarketData::healthy()
    };
    let scanner = Scanner::new(test_config(), source);

    let dashboard = scanner.try_refresh().await.unwrap().unwrap();

    // Instrument survives on configured defaults
    assert_eq!(dashboard.instruments.len(), 1);
    let snapshot = &dashboard.instruments[0].snapshot;
    assert_eq!(snapshot.current_price, dec!(135));
    assert_eq!(snapshot.volatility, dec!(0.45));
}

#[tokio::test]
async fn test_scanner_drops_instrument_without_event() {
    let source = StaticMarketData {
        event: Ok(None),
        ..StaticMarketData::healthy()
    };
    let scanner = Scanner::new(test_config(), source);

    let dashboard = scanner.try_refresh().await.unwrap().unwrap();
    assert!(dashboard.instruments.is_empty());
    assert!(dashboard.opportunities.is_empty());
}

#[tokio::test]
async fn test_scanner_book_failure_keeps_contract_row() {
    let source = StaticMarketData {
        book: None,
        ..StaticMarketData::healthy()
    };
    let scanner = Scanner::new(test_config(), source);

    let dashboard = scanner.try_refresh().await.unwrap().unwrap();

    // The contract renders with N/A metrics but is never ranked
    let rows = &dashboard.instruments[0].rows;
    assert_eq!(rows.len(), 1);
    assert!(rows[0].fair.is_some());
    assert!(rows[0].book.is_none());
    assert!(dashboard.opportunities.is_empty());
}
