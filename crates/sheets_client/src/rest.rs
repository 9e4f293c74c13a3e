//! REST client for the Google Sheets v4 API.
//!
//! Read-only: spreadsheet metadata and value ranges. Every request is
//! rate-limited and carries a service-account bearer token.

use std::sync::Arc;

use common::config::SheetsConfig;
use common::{Error, RawTable};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::auth::ServiceAccountAuth;
use crate::locator::SpreadsheetLocator;
use crate::rate_limit::RateLimiter;

/// Async REST client bound to one spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsRestClient {
    client: reqwest::Client,
    auth: Arc<ServiceAccountAuth>,
    base_url: String,
    spreadsheet: SpreadsheetLocator,
    limiter: RateLimiter,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
    #[serde(default)]
    index: u32,
}

/// Response from `spreadsheets.values.get`.
#[derive(Debug, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl SheetsRestClient {
    pub fn new(
        auth: Arc<ServiceAccountAuth>,
        spreadsheet: SpreadsheetLocator,
        config: &SheetsConfig,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent("livelo-intel/0.1")
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Http(format!("failed to build Sheets HTTP client: {e}")))?;

        Ok(Self {
            client,
            auth,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet,
            limiter: RateLimiter::per_minute(config.reads_per_minute),
        })
    }

    pub fn spreadsheet(&self) -> &SpreadsheetLocator {
        &self.spreadsheet
    }

    /// URL for `spreadsheets/{id}` followed by extra path segments.
    fn url(&self, extra: &[&str]) -> Result<Url, Error> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Configuration(format!("invalid Sheets API base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| Error::Configuration("Sheets API base cannot be a base URL".into()))?
            .pop_if_empty()
            .push("spreadsheets")
            .push(&self.spreadsheet.id)
            .extend(extra);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        self.limiter.wait_read().await;
        let token = self.auth.access_token().await?;

        debug!("GET {}", url);
        let resp = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Http(format!("GET {url}: {e}")))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp.text().await.unwrap_or_default();
            let message: String = body.chars().take(500).collect();
            return Err(match status {
                401 | 403 => Error::Authentication(format!(
                    "Sheets API refused access to {} ({}): {}",
                    self.spreadsheet.id, status, message
                )),
                _ => Error::SheetsApi { status, message },
            });
        }

        resp.json()
            .await
            .map_err(|e| Error::Http(format!("JSON decode error for {url}: {e}")))
    }

    /// Title of the first worksheet (lowest index).
    pub async fn first_sheet_title(&self) -> Result<String, Error> {
        let meta: SpreadsheetMeta = self
            .get_json(self.url(&[])?, &[("fields", "sheets.properties(title,index)")])
            .await?;

        meta.sheets
            .into_iter()
            .min_by_key(|s| s.properties.index)
            .map(|s| s.properties.title)
            .ok_or_else(|| Error::SheetsApi {
                status: 200,
                message: format!("spreadsheet {} has no worksheets", self.spreadsheet.id),
            })
    }

    /// Every formatted cell value of one worksheet.
    pub async fn get_values(&self, sheet_title: &str) -> Result<ValueRange, Error> {
        let range = a1_sheet_range(sheet_title);
        self.get_json(
            self.url(&["values", range.as_str()])?,
            &[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "FORMATTED_VALUE"),
            ],
        )
        .await
    }

    /// Fetch the first worksheet as header row + data rows.
    pub async fn fetch_first_worksheet(&self) -> Result<RawTable, Error> {
        let title = self.first_sheet_title().await?;
        let values = self.get_values(&title).await?;
        let table = value_range_to_table(values);

        info!(
            "Fetched worksheet '{}' from {}: {} data rows",
            title,
            self.spreadsheet.id,
            table.rows.len()
        );
        Ok(table)
    }
}

/// A1 range covering a whole sheet, quoting the title.
fn a1_sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// First row becomes the headers; the Sheets API omits trailing empty cells,
/// so rows may be shorter than the header.
pub fn value_range_to_table(range: ValueRange) -> RawTable {
    let mut rows = range
        .values
        .into_iter()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());

    let headers = rows.next().unwrap_or_default();
    RawTable {
        headers,
        rows: rows.collect(),
    }
}
