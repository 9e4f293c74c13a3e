//! Offer pipeline crate.
//!
//! Turns raw worksheet rows into typed offer history, caches it, derives the
//! current snapshot, and computes the filtered view, chart series, and
//! calculator figures.

pub mod calculator;
pub mod engine;
pub mod loader;
pub mod resolver;
pub mod series;
pub mod table;

pub use calculator::{calculate, format_brl, CalculatorInput, CalculatorResult};
pub use engine::{cashback_percentage, FilterCriteria, FilteredView, OfferEngine, Summary, MILHEIRO_PRICE};
pub use loader::{CachedLoader, LoadError, OfferCache, RowSource};
pub use resolver::current_snapshot;
pub use series::{build_series, default_selection, Series, SeriesPoint};
pub use table::{parse_day_first, parse_history, parse_value, ParseOptions};
