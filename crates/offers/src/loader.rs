//! Cached data loader.
//!
//! The cache is an explicit `(value, fetched_at)` pair owned by whoever owns
//! the loader; it expires purely by elapsed time. Failures are never cached,
//! so the next call after an error fetches again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use common::{Error, OfferHistory, RawTable};
use sheets_client::SheetsRestClient;
use tracing::{debug, error, info};

use crate::table::{parse_history, ParseOptions};

/// Anything that can hand over the offer worksheet.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<RawTable, Error>;
}

#[async_trait]
impl RowSource for SheetsRestClient {
    async fn fetch_rows(&self) -> Result<RawTable, Error> {
        self.fetch_first_worksheet().await
    }
}

/// The loader's failure: data is unavailable for this interaction.
#[derive(Debug, thiserror::Error)]
#[error("data unavailable: {0}")]
pub struct LoadError(#[from] pub Error);

/// A loaded history and the moment it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Arc<OfferHistory>,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn is_stale(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) >= ttl
    }
}

/// Single-slot, time-bounded cache.
#[derive(Debug, Clone)]
pub struct OfferCache {
    ttl: Duration,
    entry: Option<CacheEntry>,
}

impl OfferCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// The cached history, if still fresh at `now`.
    pub fn get(&self, now: Instant) -> Option<Arc<OfferHistory>> {
        self.entry
            .as_ref()
            .filter(|e| !e.is_stale(now, self.ttl))
            .map(|e| Arc::clone(&e.value))
    }

    pub fn put(&mut self, value: Arc<OfferHistory>, now: Instant) {
        self.entry = Some(CacheEntry {
            value,
            fetched_at: now,
        });
    }
}

/// Fetch → parse → cache.
pub struct CachedLoader<S> {
    source: S,
    options: ParseOptions,
    cache: OfferCache,
}

impl<S: RowSource> CachedLoader<S> {
    pub fn new(source: S, options: ParseOptions, ttl: Duration) -> Self {
        Self {
            source,
            options,
            cache: OfferCache::new(ttl),
        }
    }

    pub fn cache(&self) -> &OfferCache {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn load(&mut self) -> Result<Arc<OfferHistory>, LoadError> {
        self.load_at(Instant::now()).await
    }

    /// Load as of `now`: serve the cache while fresh, otherwise refetch.
    pub async fn load_at(&mut self, now: Instant) -> Result<Arc<OfferHistory>, LoadError> {
        if let Some(hit) = self.cache.get(now) {
            debug!("Offer history served from cache ({} rows)", hit.len());
            return Ok(hit);
        }

        match self.fetch().await {
            Ok(history) => {
                let history = Arc::new(history);
                self.cache.put(Arc::clone(&history), now);
                Ok(history)
            }
            Err(e) => {
                error!("Failed to load offer history: {}", e);
                Err(LoadError(e))
            }
        }
    }

    async fn fetch(&self) -> Result<OfferHistory, Error> {
        let table = self.source.fetch_rows().await?;
        let history = parse_history(&table, self.options, Utc::now())?;
        info!(
            "Loaded {} offer rows ({} dropped, {} stores)",
            history.len(),
            history.dropped_rows,
            history.stores().len()
        );
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory worksheet that counts fetches and can be told to fail.
    struct FakeSheet {
        fetches: AtomicUsize,
        table: Option<RawTable>,
    }

    impl FakeSheet {
        fn new(table: Option<RawTable>) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                table,
            }
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RowSource for FakeSheet {
        async fn fetch_rows(&self) -> Result<RawTable, Error> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.table
                .clone()
                .ok_or_else(|| Error::Http("connection refused".into()))
        }
    }

    fn table(headers: &[&str]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: vec![
                vec!["01/02/2024".into(), "10".into(), "Amazon".into()],
                vec!["??".into(), "8".into(), "Netshoes".into()],
            ],
        }
    }

    fn good_table() -> RawTable {
        table(&["Data", "Valor", "Loja", "Pontos", "Tipo", "Logo"])
    }

    #[tokio::test]
    async fn test_cache_hit_within_window_then_refetch() {
        let ttl = Duration::from_secs(600);
        let mut loader = CachedLoader::new(FakeSheet::new(Some(good_table())), ParseOptions::default(), ttl);
        let t0 = Instant::now();

        let first = loader.load_at(t0).await.expect("first load");
        let second = loader
            .load_at(t0 + Duration::from_secs(599))
            .await
            .expect("cached load");

        assert_eq!(loader.source().fetches(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);

        let third = loader.load_at(t0 + ttl).await.expect("expired load");
        assert_eq!(loader.source().fetches(), 2);
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[tokio::test]
    async fn test_loaded_history_drops_bad_dates() {
        let mut loader = CachedLoader::new(
            FakeSheet::new(Some(good_table())),
            ParseOptions::default(),
            Duration::from_secs(60),
        );
        let history = loader.load().await.expect("load");
        assert_eq!(history.len(), 1);
        assert_eq!(history.dropped_rows, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_load_error_and_not_cached() {
        let mut loader = CachedLoader::new(FakeSheet::new(None), ParseOptions::default(), Duration::from_secs(600));
        let now = Instant::now();

        let err = loader.load_at(now).await.unwrap_err();
        assert!(matches!(err.0, Error::Http(_)));
        assert!(err.to_string().starts_with("data unavailable"));

        assert!(loader.load_at(now).await.is_err());
        assert_eq!(loader.source().fetches(), 2);
        assert!(loader.cache().get(now).is_none());
    }

    #[tokio::test]
    async fn test_missing_column_is_schema_load_error() {
        let mut loader = CachedLoader::new(
            FakeSheet::new(Some(table(&["Data", "Valor", "Loja"]))),
            ParseOptions::default(),
            Duration::from_secs(600),
        );
        let err = loader.load().await.unwrap_err();
        match err.0 {
            Error::Schema { missing } => assert_eq!(missing, vec!["Pontos", "Tipo", "Logo"]),
            other => panic!("expected Schema, got {other:?}"),
        }
    }
}
