//! Spreadsheet locator: a sheet URL or bare spreadsheet ID.

use common::Error;
use url::Url;

/// Identifies the spreadsheet to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetLocator {
    pub id: String,
}

impl SpreadsheetLocator {
    /// Accepts `https://docs.google.com/spreadsheets/d/<id>/edit...` or a bare ID.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::Configuration("spreadsheet locator is empty".into()));
        }

        if raw.starts_with("http://") || raw.starts_with("https://") {
            let url = Url::parse(raw)
                .map_err(|e| Error::Configuration(format!("invalid spreadsheet URL '{raw}': {e}")))?;
            let mut segments = url.path_segments().into_iter().flatten();
            while let Some(segment) = segments.next() {
                if segment == "d" {
                    if let Some(id) = segments.next().filter(|s| is_valid_id(s)) {
                        return Ok(Self { id: id.to_string() });
                    }
                }
            }
            return Err(Error::Configuration(format!(
                "spreadsheet URL '{raw}' has no /d/<id> segment"
            )));
        }

        if is_valid_id(raw) {
            Ok(Self { id: raw.to_string() })
        } else {
            Err(Error::Configuration(format!("invalid spreadsheet ID '{raw}'")))
        }
    }
}

fn is_valid_id(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
