//! Current-offer resolution: reduce history to one record per store.
//!
//! Two policies, chosen by configuration and applied uniformly:
//!
//! * `LatestPerStore` keeps each store's newest row, so stores that were not
//!   re-synced in the last batch still show their last known offer.
//! * `LatestGlobalTimestamp` keeps only the rows stamped with the newest
//!   timestamp in the sheet ("what the last sync saw"). Stores absent from
//!   that batch disappear.
//!
//! In both cases a timestamp tie within one store goes to the row seen last,
//! and the result is ordered by store name.

use std::collections::BTreeMap;

use common::{OfferRecord, SnapshotPolicy};
use tracing::debug;

/// Derive the current snapshot from `records` under `policy`.
pub fn current_snapshot(records: &[OfferRecord], policy: SnapshotPolicy) -> Vec<OfferRecord> {
    let snapshot = match policy {
        SnapshotPolicy::LatestPerStore => latest_per_store(records.iter()),
        SnapshotPolicy::LatestGlobalTimestamp => {
            let Some(newest) = records.iter().map(|r| r.timestamp).max() else {
                return Vec::new();
            };
            latest_per_store(records.iter().filter(|r| r.timestamp == newest))
        }
    };

    debug!(
        "Snapshot ({}): {} store(s) from {} row(s)",
        policy,
        snapshot.len(),
        records.len()
    );
    snapshot
}

fn latest_per_store<'a>(records: impl Iterator<Item = &'a OfferRecord>) -> Vec<OfferRecord> {
    let mut latest: BTreeMap<&str, &OfferRecord> = BTreeMap::new();
    for rec in records {
        match latest.get(rec.store.as_str()) {
            Some(current) if current.timestamp > rec.timestamp => {}
            _ => {
                latest.insert(&rec.store, rec);
            }
        }
    }
    latest.into_values().cloned().collect()
}
