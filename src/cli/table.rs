//! Plain-text table rendering
//!
//! Unavailable metrics always render as "N/A"; a bad metric never hides the
//! rest of its row.

use crate::config::PricingConfig;
use crate::scanner::{ChangeSet, Dashboard, InstrumentView, Opportunity, OpportunityKey};
use rust_decimal::Decimal;

/// Render the global top-opportunities table with change markers
pub fn render_opportunities(dashboard: &Dashboard) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Top opportunities ({} rows) - refreshed {}\n",
        dashboard.opportunities.len(),
        dashboard.refreshed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "{:<4}{:<8}{:>10}  {:>16}  {:>7}{:>9}  {:>7}{:>9}  {:>8}  {:<4}{:>9}{:>8}  {}\n",
        "#", "TICKER", "STRIKE", "PROB (NO)", "ASK", "EDGE", "BUY NO", "EDGE", "MKT YES", "SIDE",
        "ROI", "KELLY", "FLAGS"
    ));

    for (i, opp) in dashboard.opportunities.iter().enumerate() {
        out.push_str(&render_opportunity_row(i + 1, opp, &dashboard.changes));
    }

    if dashboard.opportunities.is_empty() {
        out.push_str("  (no rankable contracts this cycle)\n");
    }

    out
}

fn render_opportunity_row(rank: usize, opp: &Opportunity, changes: &ChangeSet) -> String {
    let key = opp.key();
    let prob_no = Decimal::ONE - opp.probability;

    format!(
        "{:<4}{:<8}{:>10}  {:>16}  {:>7}{:>9}  {:>7}{:>9}  {:>8}  {:<4}{:>9}{:>8}  {}\n",
        rank,
        opp.ticker,
        format!("${}", opp.strike_price.round_dp(2)),
        format!("{} ({})", pct(opp.probability, 2), pct(prob_no, 2)),
        price(opp.best_ask),
        signed_pct(opp.edge_vs_ask),
        price(opp.buy_no_price),
        signed_pct(opp.edge_vs_bid),
        opt_pct(opp.market_yes, 1),
        opp.side.to_string(),
        signed_pct(opp.roi),
        format!("{}%", opp.display_kelly_pct().round_dp(1)),
        flags(&key, changes),
    )
}

fn flags(key: &OpportunityKey, changes: &ChangeSet) -> String {
    if changes.new_rows.contains(key) {
        return "new".to_string();
    }
    match changes.changed_rows.get(key) {
        Some(fields) => fields
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(","),
        None => String::new(),
    }
}

/// Render one instrument's contracts sorted by strike
pub fn render_instrument(view: &InstrumentView, pricing: &PricingConfig) -> String {
    let mut out = String::new();

    let snapshot = &view.snapshot;
    let days = (snapshot.time_to_expiry_years * pricing.trading_days_per_year as f64).round();

    out.push_str(&format!(
        "{} - {}\n",
        view.instrument.ticker, view.instrument.name
    ));
    out.push_str(&format!("{}\n", view.title));
    out.push_str(&format!(
        "spot ${}  vol {}  rate {}  ~{} trading days to resolution\n",
        snapshot.current_price.round_dp(2),
        pct(snapshot.volatility, 1),
        pct(snapshot.risk_free_rate, 2),
        days,
    ));
    out.push_str(&format!(
        "{:>10}  {:>16}  {:>7}{:>9}  {:>7}{:>9}  {:>8}  {:<4}{:>9}{:>8}\n",
        "STRIKE", "PROB (NO)", "ASK", "EDGE", "BUY NO", "EDGE", "MKT YES", "SIDE", "ROI", "KELLY"
    ));

    for row in &view.rows {
        let strike = match row.contract.strike_price {
            Some(s) => format!("${}", s.round_dp(2)),
            None => "N/A".to_string(),
        };

        let prob = match &row.fair {
            Some(f) => format!(
                "{} ({})",
                pct(f.probability, 2),
                pct(Decimal::ONE - f.probability, 2)
            ),
            None => "N/A".to_string(),
        };

        let ask = match &row.book {
            Some(b) => price(b.best_ask),
            None => "N/A".to_string(),
        };
        let buy_no = match row.metrics.buy_no_price {
            Some(p) => price(p),
            None => "N/A".to_string(),
        };

        let (side, roi, kelly) = match &row.metrics.headline {
            Some(h) => (
                h.side.to_string(),
                signed_pct(h.roi),
                format!(
                    "{}%",
                    (h.kelly * Decimal::ONE_HUNDRED)
                        .min(Decimal::ONE_HUNDRED)
                        .round_dp(1)
                ),
            ),
            None => ("".to_string(), "N/A".to_string(), "N/A".to_string()),
        };

        out.push_str(&format!(
            "{:>10}  {:>16}  {:>7}{:>9}  {:>7}{:>9}  {:>8}  {:<4}{:>9}{:>8}\n",
            strike,
            prob,
            ask,
            opt_signed_pct(row.edge_vs_ask),
            buy_no,
            opt_signed_pct(row.metrics.bs_no_price.zip(row.metrics.buy_no_price).map(|(n, b)| n - b)),
            opt_pct(row.contract.yes_probability, 1),
            side,
            roi,
            kelly,
        ));
    }

    out
}

fn pct(value: Decimal, dp: u32) -> String {
    format!("{}%", (value * Decimal::ONE_HUNDRED).round_dp(dp))
}

fn signed_pct(value: Decimal) -> String {
    let scaled = (value * Decimal::ONE_HUNDRED).round_dp(1);
    if scaled >= Decimal::ZERO {
        format!("+{}%", scaled)
    } else {
        format!("{}%", scaled)
    }
}

fn opt_signed_pct(value: Option<Decimal>) -> String {
    match value {
        Some(v) => signed_pct(v),
        None => "N/A".to_string(),
    }
}

fn opt_pct(value: Option<Decimal>, dp: u32) -> String {
    match value {
        Some(v) => pct(v, dp),
        None => "N/A".to_string(),
    }
}

fn price(value: Decimal) -> String {
    value.round_dp(3).to_string()
}
