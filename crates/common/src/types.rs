//! Domain types shared across the workspace.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Source table ──────────────────────────────────────────────────────

/// Column headers expected in the first worksheet.
pub const COL_DATE: &str = "Data";
pub const COL_VALUE: &str = "Valor";
pub const COL_STORE: &str = "Loja";
pub const COL_POINTS: &str = "Pontos";
pub const COL_TYPE: &str = "Tipo";
pub const COL_LOGO: &str = "Logo";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_DATE, COL_VALUE, COL_STORE, COL_POINTS, COL_TYPE, COL_LOGO,
];

/// Raw worksheet contents: the header row plus every data row as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ── Offers ────────────────────────────────────────────────────────────

/// One observed offer from a partner store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub store: String,
    pub timestamp: NaiveDateTime,
    /// Points per R$. `None` when the cell could not be parsed.
    pub value: Option<f64>,
    pub points_label: String,
    #[serde(rename = "type")]
    pub offer_type: String,
    pub logo_url: String,
    /// 0-based data row in the source sheet.
    pub row: usize,
}

/// Every offer row currently present in the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferHistory {
    pub records: Vec<OfferRecord>,
    pub fetched_at: DateTime<Utc>,
    /// Rows excluded because their date did not parse.
    pub dropped_rows: usize,
}

impl OfferHistory {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct store names in sheet order.
    pub fn stores(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for rec in &self.records {
            if !seen.contains(&rec.store.as_str()) {
                seen.push(&rec.store);
            }
        }
        seen
    }
}

// ── Policies ──────────────────────────────────────────────────────────

/// How the "current" offer per store is derived from history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapshotPolicy {
    /// Most recent row of each store, independently.
    #[default]
    LatestPerStore,
    /// Only rows sharing the newest timestamp in the whole sheet.
    LatestGlobalTimestamp,
}

impl FromStr for SnapshotPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "latest-per-store" | "per-store" => Ok(Self::LatestPerStore),
            "latest-global-timestamp" | "global" => Ok(Self::LatestGlobalTimestamp),
            other => Err(format!(
                "unknown policy '{other}' (expected latest-per-store or latest-global-timestamp)"
            )),
        }
    }
}

impl fmt::Display for SnapshotPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LatestPerStore => write!(f, "latest-per-store"),
            Self::LatestGlobalTimestamp => write!(f, "latest-global-timestamp"),
        }
    }
}

/// What an unparseable `Valor` cell becomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidValuePolicy {
    #[default]
    Missing,
    Zero,
}

impl FromStr for InvalidValuePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "missing" | "none" | "nan" => Ok(Self::Missing),
            "zero" | "0" => Ok(Self::Zero),
            other => Err(format!("unknown invalid_value '{other}' (expected missing or zero)")),
        }
    }
}
