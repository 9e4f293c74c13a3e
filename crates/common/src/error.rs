//! Unified error type for livelo-intel.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or malformed credentials, locator, or settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The token endpoint rejected the signed credential.
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Schema error: missing column(s) {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A single row could not be coerced. Handled by excluding the row.
    #[error("Parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("Google Sheets API error (status={status}): {message}")]
    SheetsApi { status: u16, message: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Render error: {0}")]
    Render(#[from] std::fmt::Error),
}
