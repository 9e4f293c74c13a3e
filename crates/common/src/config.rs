//! Application configuration types.

use serde::{Deserialize, Serialize};

use crate::types::{InvalidValuePolicy, SnapshotPolicy};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Spreadsheet URL or bare ID. Used when the secrets carry no locator.
    #[serde(default)]
    pub spreadsheet_url: String,

    /// Path of the secrets file holding the service-account credential.
    #[serde(default = "default_secrets_path")]
    pub secrets_path: String,

    /// Current-offer policy, applied to every view of a run.
    #[serde(default)]
    pub policy: SnapshotPolicy,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub filters: FilterConfig,

    #[serde(default)]
    pub parsing: ParsingConfig,

    #[serde(default)]
    pub calculator: CalculatorConfig,

    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Secrets mapping (from the secrets file and `GOOGLE_JSON_CREDENTIALS`).
    /// Never read from or written to `config.toml`.
    #[serde(skip)]
    pub secrets: serde_json::Value,
}

/// Loader cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a fetched sheet stays fresh.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

/// Default card-grid filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Inclusive minimum points per R$.
    #[serde(default = "default_min_value")]
    pub min_value: f64,

    /// Case-insensitive store-name substring.
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingConfig {
    #[serde(default)]
    pub invalid_value: InvalidValuePolicy,
}

/// Profit calculator defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// R$ received per milheiro (1,000 points).
    #[serde(default = "default_sell_price")]
    pub sell_price: f64,

    /// Points per R$ used when `--rate` is omitted.
    #[serde(default = "default_rate")]
    pub default_rate: f64,
}

/// Google Sheets API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_reads_per_minute")]
    pub reads_per_minute: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_secrets_path() -> String {
    "secrets.toml".into()
}
fn default_cache_ttl() -> u64 {
    600
}
fn default_min_value() -> f64 {
    5.0
}
fn default_sell_price() -> f64 {
    35.0
}
fn default_rate() -> f64 {
    10.0
}
fn default_api_base() -> String {
    "https://sheets.googleapis.com/v4".into()
}
fn default_reads_per_minute() -> u32 {
    60
}
fn default_timeout() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            spreadsheet_url: String::new(),
            secrets_path: default_secrets_path(),
            policy: SnapshotPolicy::default(),
            cache: CacheConfig::default(),
            filters: FilterConfig::default(),
            parsing: ParsingConfig::default(),
            calculator: CalculatorConfig::default(),
            sheets: SheetsConfig::default(),
            secrets: serde_json::Value::Null,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_value: default_min_value(),
            search: None,
        }
    }
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            sell_price: default_sell_price(),
            default_rate: default_rate(),
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            reads_per_minute: default_reads_per_minute(),
            timeout_secs: default_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{"policy": "latest-global-timestamp", "filters": {"search": "shop"}}"#,
        )
        .expect("config should deserialize");

        assert_eq!(cfg.policy, SnapshotPolicy::LatestGlobalTimestamp);
        assert_eq!(cfg.filters.search.as_deref(), Some("shop"));
        assert_eq!(cfg.filters.min_value, 5.0);
        assert_eq!(cfg.cache.ttl_secs, 600);
        assert_eq!(cfg.calculator.sell_price, 35.0);
        assert_eq!(cfg.parsing.invalid_value, InvalidValuePolicy::Missing);
    }
}
