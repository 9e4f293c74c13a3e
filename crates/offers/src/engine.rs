//! Filter/aggregate engine.
//!
//! Applies the threshold and store search to the current snapshot and
//! computes the dashboard's headline metrics.

use common::{OfferHistory, OfferRecord, SnapshotPolicy};
use serde::Serialize;
use tracing::debug;

use crate::resolver::current_snapshot;

/// R$ paid per milheiro (1,000 points) on the secondary market.
pub const MILHEIRO_PRICE: f64 = 35.0;

/// Estimated cashback % for an accrual rate of `value` points per R$.
pub fn cashback_percentage(value: f64) -> f64 {
    (value * MILHEIRO_PRICE / 1000.0) * 100.0
}

/// Card-grid filters.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Inclusive minimum points per R$.
    pub min_value: f64,
    /// Case-insensitive substring of the store name. Blank means no filter.
    pub search: Option<String>,
}

impl FilterCriteria {
    pub fn new(min_value: f64, search: Option<String>) -> Self {
        let search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        Self { min_value, search }
    }

    /// Rows with no parsed value never pass, and nothing passes a NaN
    /// threshold.
    pub fn matches(&self, rec: &OfferRecord) -> bool {
        let Some(value) = rec.value else {
            return false;
        };
        if self.min_value.is_nan() || value < self.min_value {
            return false;
        }
        match &self.search {
            Some(needle) => rec.store.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::new(5.0, None)
    }
}

/// Headline metrics for the filtered view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub active_partners: usize,
    /// Highest-value offer; the earliest listed wins a tie.
    pub best: Option<OfferRecord>,
    /// `0.0` when there is no best offer.
    pub cashback_pct: f64,
    pub history_rows: usize,
    pub snapshot_stores: usize,
    pub dropped_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilteredView {
    pub records: Vec<OfferRecord>,
    pub summary: Summary,
}

impl FilteredView {
    /// Filter an already-resolved snapshot.
    pub fn from_snapshot(snapshot: &[OfferRecord], criteria: &FilterCriteria) -> Self {
        let records: Vec<OfferRecord> = snapshot
            .iter()
            .filter(|r| criteria.matches(r))
            .cloned()
            .collect();

        let best = best_offer(&records).cloned();
        let cashback_pct = best
            .as_ref()
            .and_then(|b| b.value)
            .map(cashback_percentage)
            .unwrap_or(0.0);

        let summary = Summary {
            active_partners: records.len(),
            best,
            cashback_pct,
            history_rows: 0,
            snapshot_stores: snapshot.len(),
            dropped_rows: 0,
        };

        Self { records, summary }
    }
}

fn best_offer(records: &[OfferRecord]) -> Option<&OfferRecord> {
    let mut best: Option<&OfferRecord> = None;
    for rec in records {
        let Some(value) = rec.value else { continue };
        match best.and_then(|b| b.value) {
            Some(top) if top >= value => {}
            _ => best = Some(rec),
        }
    }
    best
}

/// Snapshot policy + filters, evaluated against a loaded history.
#[derive(Debug, Clone)]
pub struct OfferEngine {
    pub policy: SnapshotPolicy,
    pub criteria: FilterCriteria,
}

impl OfferEngine {
    pub fn new(policy: SnapshotPolicy, criteria: FilterCriteria) -> Self {
        Self { policy, criteria }
    }

    /// Resolve the snapshot, then filter it.
    pub fn evaluate(&self, history: &OfferHistory) -> FilteredView {
        let snapshot = current_snapshot(&history.records, self.policy);
        let mut view = FilteredView::from_snapshot(&snapshot, &self.criteria);
        view.summary.history_rows = history.len();
        view.summary.dropped_rows = history.dropped_rows;

        debug!(
            "Filtered view: {}/{} store(s) pass min={} search={:?}",
            view.records.len(),
            snapshot.len(),
            self.criteria.min_value,
            self.criteria.search
        );
        view
    }
}
