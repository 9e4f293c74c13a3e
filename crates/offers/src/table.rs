//! Raw worksheet → typed offer history.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, warn};

use common::{
    Error, InvalidValuePolicy, OfferHistory, OfferRecord, RawTable, COL_DATE, COL_LOGO,
    COL_POINTS, COL_STORE, COL_TYPE, COL_VALUE, REQUIRED_COLUMNS,
};

/// Row-coercion settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub invalid_value: InvalidValuePolicy,
}

// Two-digit-year formats come first: `%Y` would happily read "24" as year 24.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%y %H:%M:%S",
    "%d/%m/%y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y-%m-%d",
];

/// Parse a sheet date, resolving `01/02` as 1 February.
pub fn parse_day_first(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Permissive numeric parse: `"10"`, `" 7,5 "`, `"12 pts"`, `"1.234,5"`,
/// `"1.234.567"`, `"5e3"`.
///
/// The number must be a complete token: it may be followed by whitespace and
/// a unit, but not by glued-on text (`"12abc34"` is `None`).
pub fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+' | 'e' | 'E')))
        .unwrap_or(trimmed.len());
    let (token, rest) = trimmed.split_at(end);
    if token.is_empty() || !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return None;
    }

    normalize_separators(token)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Rewrite a token with `.`/`,` grouping into plain `1234.5` form.
///
/// With both separators the later one is the decimal mark. A lone comma is
/// decimal; repeated marks of one kind are thousands separators.
fn normalize_separators(token: &str) -> String {
    let commas = token.matches(',').count();
    let dots = token.matches('.').count();

    match (commas, dots) {
        (0, 0) | (0, 1) => token.to_string(),
        (1, 0) => token.replace(',', "."),
        (_, 0) => token.replace(',', ""),
        (0, _) => token.replace('.', ""),
        _ => {
            let last_comma = token.rfind(',').unwrap_or(0);
            let last_dot = token.rfind('.').unwrap_or(0);
            if last_comma > last_dot {
                token.replace('.', "").replace(',', ".")
            } else {
                token.replace(',', "")
            }
        }
    }
}

struct ColumnIndex {
    date: usize,
    value: usize,
    store: usize,
    points: usize,
    offer_type: usize,
    logo: usize,
}

impl ColumnIndex {
    fn locate(headers: &[String]) -> Result<Self, Error> {
        let trimmed: Vec<&str> = headers.iter().map(|h| h.trim()).collect();
        let find = |name: &str| trimmed.iter().position(|h| *h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| find(*c).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(Error::Schema { missing });
        }

        let idx = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            date: idx(COL_DATE),
            value: idx(COL_VALUE),
            store: idx(COL_STORE),
            points: idx(COL_POINTS),
            offer_type: idx(COL_TYPE),
            logo: idx(COL_LOGO),
        })
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Build typed history from a raw worksheet.
///
/// Fails only on a missing column. Rows with an unparseable date are
/// dropped and counted; unparseable values follow `options.invalid_value`.
pub fn parse_history(
    table: &RawTable,
    options: ParseOptions,
    fetched_at: DateTime<Utc>,
) -> Result<OfferHistory, Error> {
    let cols = ColumnIndex::locate(&table.headers)?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut dropped_rows = 0usize;
    let mut invalid_values = 0usize;

    for (row_idx, row) in table.rows.iter().enumerate() {
        let raw_date = cell(row, cols.date);
        let Some(timestamp) = parse_day_first(raw_date) else {
            let err = Error::Parse {
                row: row_idx,
                message: format!("unparseable date '{raw_date}'"),
            };
            debug!("Dropping row: {}", err);
            dropped_rows += 1;
            continue;
        };

        let value = match parse_value(cell(row, cols.value)) {
            Some(v) => Some(v),
            None => {
                invalid_values += 1;
                match options.invalid_value {
                    InvalidValuePolicy::Missing => None,
                    InvalidValuePolicy::Zero => Some(0.0),
                }
            }
        };

        records.push(OfferRecord {
            store: cell(row, cols.store).trim().to_string(),
            timestamp,
            value,
            points_label: cell(row, cols.points).trim().to_string(),
            offer_type: cell(row, cols.offer_type).trim().to_string(),
            logo_url: cell(row, cols.logo).trim().to_string(),
            row: row_idx,
        });
    }

    if dropped_rows > 0 {
        warn!("Dropped {} row(s) with unparseable dates", dropped_rows);
    }
    if invalid_values > 0 {
        debug!(
            "{} row(s) had a non-numeric value (policy={:?})",
            invalid_values, options.invalid_value
        );
    }

    Ok(OfferHistory {
        records,
        fetched_at,
        dropped_rows,
    })
}
