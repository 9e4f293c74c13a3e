//! Google Sheets API client library.
//!
//! Resolves service-account credentials from loosely formatted secrets and
//! provides authenticated, rate-limited read access to a spreadsheet.

pub mod auth;
pub mod credentials;
pub mod locator;
pub mod rate_limit;
pub mod rest;

#[cfg(test)]
mod test_support;

pub use auth::ServiceAccountAuth;
pub use credentials::{normalize_private_key, resolve_credentials, ResolvedCredentials, ServiceAccountKey};
pub use locator::SpreadsheetLocator;
pub use rate_limit::RateLimiter;
pub use rest::SheetsRestClient;
