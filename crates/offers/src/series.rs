//! Per-store time series for the history chart.

use chrono::NaiveDateTime;
use common::OfferHistory;
use serde::Serialize;
use tracing::warn;

/// Stores plotted when none are selected.
const DEFAULT_SERIES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub store: String,
    pub points: Vec<SeriesPoint>,
}

/// The first two stores in sheet order.
pub fn default_selection(history: &OfferHistory) -> Vec<String> {
    history
        .stores()
        .into_iter()
        .take(DEFAULT_SERIES)
        .map(str::to_string)
        .collect()
}

/// One series per selected store, points in ascending time order.
///
/// Works on the full, unfiltered history. Unknown or repeated store names
/// are skipped.
pub fn build_series(history: &OfferHistory, stores: &[String]) -> Vec<Series> {
    let mut out: Vec<Series> = Vec::with_capacity(stores.len());

    for store in stores {
        let store = store.trim();
        if out.iter().any(|s| s.store == store) {
            continue;
        }

        let mut points: Vec<SeriesPoint> = history
            .records
            .iter()
            .filter(|r| r.store == store)
            .map(|r| SeriesPoint {
                timestamp: r.timestamp,
                value: r.value,
            })
            .collect();

        if points.is_empty() {
            warn!("No history for store '{}'", store);
            continue;
        }

        points.sort_by_key(|p| p.timestamp);
        out.push(Series {
            store: store.to_string(),
            points,
        });
    }

    out
}
