//! Change detection between refresh cycles
//!
//! Diffs the current ranked list against the prior cycle's snapshot to flag
//! new and materially changed rows. Purely advisory; never reorders anything.

use super::types::{Opportunity, OpportunityKey};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Fields compared between refresh cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangedField {
    Roi,
    BestAsk,
    BuyNo,
    Kelly,
}

impl std::fmt::Display for ChangedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangedField::Roi => write!(f, "roi"),
            ChangedField::BestAsk => write!(f, "ask"),
            ChangedField::BuyNo => write!(f, "buyNo"),
            ChangedField::Kelly => write!(f, "kelly"),
        }
    }
}

/// Prior-cycle view of one ranked opportunity
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEntry {
    pub key: OpportunityKey,
    pub roi: Decimal,
    pub best_ask: Decimal,
    pub buy_no_price: Decimal,
    pub kelly: Decimal,
}

impl From<&Opportunity> for SnapshotEntry {
    fn from(opp: &Opportunity) -> Self {
        Self {
            key: opp.key(),
            roi: opp.roi,
            best_ask: opp.best_ask,
            buy_no_price: opp.buy_no_price,
            kelly: opp.kelly_fraction,
        }
    }
}

/// New/changed markers for the current ranked list
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub new_rows: HashSet<OpportunityKey>,
    pub changed_rows: HashMap<OpportunityKey, Vec<ChangedField>>,
}

impl ChangeSet {
    /// True when nothing is flagged
    pub fn is_empty(&self) -> bool {
        self.new_rows.is_empty() && self.changed_rows.is_empty()
    }
}

/// Percentage-point threshold for ROI and Kelly changes
const PCT_POINT_THRESHOLD: Decimal = dec!(0.5);
/// Absolute threshold for price changes
const PRICE_THRESHOLD: Decimal = dec!(0.001);

/// Diff the current ranked list against the previous snapshot
///
/// With no previous snapshot (first run) nothing is flagged. With a previous
/// snapshot, a missing key is "new" and a key whose tracked fields moved past
/// their thresholds is "changed" with the offending fields listed.
pub fn detect_changes(previous: Option<&[SnapshotEntry]>, current: &[Opportunity]) -> ChangeSet {
    let mut changes = ChangeSet::default();

    let Some(previous) = previous else {
        return changes;
    };

    let prev_map: HashMap<&OpportunityKey, &SnapshotEntry> =
        previous.iter().map(|entry| (&entry.key, entry)).collect();

    for opp in current {
        let key = opp.key();
        match prev_map.get(&key) {
            None => {
                changes.new_rows.insert(key);
            }
            Some(prev) => {
                let mut fields = Vec::new();

                if pct_points(opp.roi - prev.roi) > PCT_POINT_THRESHOLD {
                    fields.push(ChangedField::Roi);
                }
                if (opp.best_ask - prev.best_ask).abs() > PRICE_THRESHOLD {
                    fields.push(ChangedField::BestAsk);
                }
                if (opp.buy_no_price - prev.buy_no_price).abs() > PRICE_THRESHOLD {
                    fields.push(ChangedField::BuyNo);
                }
                if pct_points(opp.kelly_fraction - prev.kelly) > PCT_POINT_THRESHOLD {
                    fields.push(ChangedField::Kelly);
                }

                if !fields.is_empty() {
                    changes.changed_rows.insert(key, fields);
                }
            }
        }
    }

    changes
}

fn pct_points(delta: Decimal) -> Decimal {
    (delta * Decimal::ONE_HUNDRED).abs()
}
