//! Per-contract side metrics and cross-instrument ranking
//!
//! ROI on a $1 stake against the observable book, Kelly fractions for
//! positive-ROI sides, and the descending-ROI top-N cut.

use super::types::{InstrumentView, Opportunity, Side};
use crate::model::FairValue;
use crate::orderbook::BookSummary;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Probability floor below which the discount factor falls back to 1
const MIN_DISCOUNT_PROB: Decimal = dec!(0.001);

/// Per-side metrics for one contract
///
/// A None ROI means the metric is unavailable (missing fair value, missing
/// book, or a zero transaction price) and renders as N/A.
#[derive(Debug, Clone, Default)]
pub struct SideMetrics {
    pub roi_yes: Option<Decimal>,
    pub kelly_yes: Decimal,
    pub roi_no: Option<Decimal>,
    pub kelly_no: Decimal,
    /// Fair price of the NO side, discounted like YES
    pub bs_no_price: Option<Decimal>,
    /// Cost of taking NO against the best bid
    pub buy_no_price: Option<Decimal>,
    /// Selected side and its metrics; None when neither side is computable
    pub headline: Option<Headline>,
}

/// The chosen side's published metrics
#[derive(Debug, Clone, Copy)]
pub struct Headline {
    pub side: Side,
    pub roi: Decimal,
    pub kelly: Decimal,
}

/// Evaluate both sides of a contract
pub fn evaluate_sides(fair: Option<&FairValue>, book: Option<&BookSummary>) -> SideMetrics {
    let buy_no_price = book.map(|b| Decimal::ONE - b.best_bid);

    // NO side priced with the same discounting as YES: separate the discount
    // factor from the probability before re-applying it to (1 - p)
    let bs_no_price = fair.map(|f| {
        let discount_factor = if f.probability > MIN_DISCOUNT_PROB {
            f.fair_value / f.probability
        } else {
            Decimal::ONE
        };
        discount_factor * (Decimal::ONE - f.probability)
    });

    let mut roi_yes = None;
    let mut kelly_yes = Decimal::ZERO;
    if let (Some(f), Some(b)) = (fair, book) {
        if b.best_ask > Decimal::ZERO {
            let roi = (f.fair_value - b.best_ask) / b.best_ask;
            roi_yes = Some(roi);
            if roi > Decimal::ZERO && b.best_ask < Decimal::ONE {
                kelly_yes = (f.probability - b.best_ask) / (Decimal::ONE - b.best_ask);
            }
        }
    }

    let mut roi_no = None;
    let mut kelly_no = Decimal::ZERO;
    if let (Some(f), Some(no_price), Some(buy_no)) = (fair, bs_no_price, buy_no_price) {
        if buy_no > Decimal::ZERO {
            let roi = (no_price - buy_no) / buy_no;
            roi_no = Some(roi);
            if roi > Decimal::ZERO && buy_no < Decimal::ONE {
                let prob_no = Decimal::ONE - f.probability;
                kelly_no = (prob_no - buy_no) / (Decimal::ONE - buy_no);
            }
        }
    }

    // Tie-break favors YES
    let headline = match (roi_yes, roi_no) {
        (Some(yes), Some(no)) if yes >= no => Some(Headline {
            side: Side::Yes,
            roi: yes,
            kelly: kelly_yes,
        }),
        (Some(_), Some(no)) => Some(Headline {
            side: Side::No,
            roi: no,
            kelly: kelly_no,
        }),
        (Some(yes), None) => Some(Headline {
            side: Side::Yes,
            roi: yes,
            kelly: kelly_yes,
        }),
        (None, Some(no)) => Some(Headline {
            side: Side::No,
            roi: no,
            kelly: kelly_no,
        }),
        (None, None) => None,
    };

    SideMetrics {
        roi_yes,
        kelly_yes,
        roi_no,
        kelly_no,
        bs_no_price,
        buy_no_price,
        headline,
    }
}

/// Rank opportunities across all instruments
///
/// Contracts without a computable headline (or without a strike) never enter
/// the list; the rest sort descending by headline ROI and truncate to top N.
pub fn rank_opportunities(views: &[InstrumentView], top_n: usize) -> Vec<Opportunity> {
    let mut all: Vec<Opportunity> = Vec::new();

    for view in views {
        for row in &view.rows {
            let Some(headline) = row.metrics.headline else {
                continue;
            };
            let (Some(fair), Some(book)) = (row.fair.as_ref(), row.book.as_ref()) else {
                continue;
            };
            let Some(strike_price) = row.contract.strike_price else {
                continue;
            };
            let (Some(bs_no), Some(buy_no)) =
                (row.metrics.bs_no_price, row.metrics.buy_no_price)
            else {
                continue;
            };

            all.push(Opportunity {
                ticker: view.instrument.ticker.clone(),
                strike_price,
                side: headline.side,
                roi: headline.roi,
                kelly_fraction: headline.kelly,
                probability: fair.probability,
                fair_value: fair.fair_value,
                best_ask: book.best_ask,
                best_bid: book.best_bid,
                buy_no_price: buy_no,
                edge_vs_ask: fair.fair_value - book.best_ask,
                edge_vs_bid: bs_no - buy_no,
                market_yes: row.contract.yes_probability,
            });
        }
    }

    all.sort_by(|a, b| b.roi.cmp(&a.roi));
    all.truncate(top_n);
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fair(fair_value: Decimal, probability: Decimal) -> FairValue {
        FairValue {
            fair_value,
            probability,
        }
    }

    fn book(best_bid: Decimal, best_ask: Decimal) -> BookSummary {
        BookSummary {
            best_bid,
            best_ask,
            spread: best_ask - best_bid,
            total_bid_liquidity: dec!(100),
            total_ask_liquidity: dec!(100),
        }
    }

    #[test]
    fn test_yes_side_roi_and_kelly() {
        let f = fair(dec!(0.40), dec!(0.41));
        let b = book(dec!(0.25), dec!(0.30));
        let m = evaluate_sides(Some(&f), Some(&b));

        // roi = (0.40 - 0.30) / 0.30
        let roi = m.roi_yes.unwrap();
        assert!((roi - dec!(0.3333333333333333333333333333)).abs() < dec!(0.000000000001));
        // kelly = (0.41 - 0.30) / 0.70
        assert!((m.kelly_yes - dec!(0.1571428571428571428571428571)).abs() < dec!(0.000000000001));
    }

    #[test]
    fn test_no_side_uses_discounted_price() {
        // fair = 0.20, prob = 0.25 -> discount factor 0.8, bsNo = 0.8 * 0.75 = 0.6
        let f = fair(dec!(0.20), dec!(0.25));
        let b = book(dec!(0.55), dec!(0.60));
        let m = evaluate_sides(Some(&f), Some(&b));

        assert_eq!(m.bs_no_price, Some(dec!(0.6)));
        assert_eq!(m.buy_no_price, Some(dec!(0.45)));
        // roi_no = (0.6 - 0.45) / 0.45
        let roi = m.roi_no.unwrap();
        assert!((roi - dec!(0.3333333333333333333333333333)).abs() < dec!(0.000000000001));
        // kelly_no = (0.75 - 0.45) / 0.55
        assert!((m.kelly_no - dec!(0.5454545454545454545454545455)).abs() < dec!(0.000000000001));
    }

    #[test]
    fn test_tiny_probability_skips_discount_separation() {
        let f = fair(dec!(0.0005), dec!(0.0005));
        let b = book(dec!(0.10), dec!(0.90));
        let m = evaluate_sides(Some(&f), Some(&b));

        // discount factor falls back to 1: bsNo = 1 - p
        assert_eq!(m.bs_no_price, Some(dec!(0.9995)));
    }

    #[test]
    fn test_tie_break_favors_yes() {
        // Symmetric fair/book so both ROIs are equal and negative
        let f = fair(dec!(0.5), dec!(0.5));
        let b = book(dec!(0.4), dec!(0.6));
        let m = evaluate_sides(Some(&f), Some(&b));

        assert_eq!(m.roi_yes, m.roi_no);
        let headline = m.headline.unwrap();
        assert_eq!(headline.side, Side::Yes);
    }

    #[test]
    fn test_negative_roi_zeroes_kelly() {
        let f = fair(dec!(0.25), dec!(0.26));
        let b = book(dec!(0.20), dec!(0.30));
        let m = evaluate_sides(Some(&f), Some(&b));

        assert!(m.roi_yes.unwrap() < Decimal::ZERO);
        assert_eq!(m.kelly_yes, Decimal::ZERO);
    }

    #[test]
    fn test_missing_fair_value_gives_no_metrics() {
        let b = book(dec!(0.25), dec!(0.30));
        let m = evaluate_sides(None, Some(&b));

        assert!(m.roi_yes.is_none());
        assert!(m.roi_no.is_none());
        assert!(m.headline.is_none());
        assert_eq!(m.buy_no_price, Some(dec!(0.75)));
    }

    #[test]
    fn test_missing_book_gives_no_metrics() {
        let f = fair(dec!(0.40), dec!(0.41));
        let m = evaluate_sides(Some(&f), None);

        assert!(m.roi_yes.is_none());
        assert!(m.roi_no.is_none());
        assert!(m.headline.is_none());
    }

    #[test]
    fn test_zero_ask_makes_yes_unavailable() {
        let f = fair(dec!(0.40), dec!(0.41));
        let b = book(dec!(0.25), dec!(0));
        let m = evaluate_sides(Some(&f), Some(&b));

        assert!(m.roi_yes.is_none());
        // NO side still computes, so the headline exists
        let headline = m.headline.unwrap();
        assert_eq!(headline.side, Side::No);
    }

    #[test]
    fn test_full_bid_makes_no_unavailable() {
        let f = fair(dec!(0.40), dec!(0.41));
        let b = book(dec!(1), dec!(0.30));
        let m = evaluate_sides(Some(&f), Some(&b));

        // buy_no_price = 0 -> NO unavailable; YES still selected
        assert_eq!(m.buy_no_price, Some(dec!(0)));
        assert!(m.roi_no.is_none());
        assert_eq!(m.headline.unwrap().side, Side::Yes);
    }
}
