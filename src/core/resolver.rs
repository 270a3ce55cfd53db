use crate::core::cache::PriceCache;
use crate::core::price::{PriceQuote, PriceSource, QuoteSource};
use anyhow::Error;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

/// Outcome of resolving a price for one date.
#[derive(Debug)]
pub enum Resolution {
    Resolved(PriceQuote),
    /// The source has no market data for the date. Never cached.
    NoData,
    /// The source could not be reached or returned a malformed payload.
    /// Never cached.
    Failed(Error),
}

/// Decides when to fetch and what to cache. Storage itself lives in
/// [`PriceCache`].
pub struct PriceResolver {
    source: Arc<dyn PriceSource>,
    cache: Arc<PriceCache>,
}

impl PriceResolver {
    pub fn new(source: Arc<dyn PriceSource>, cache: Arc<PriceCache>) -> Self {
        Self { source, cache }
    }

    /// Resolves the close price for a date. A cache hit never touches the
    /// network; once any resolution has succeeded for a date, in this run or
    /// an earlier one, no further fetch is attempted for it.
    pub async fn resolve(&self, date: NaiveDate) -> Resolution {
        if let Some(price) = self.cache.get(date).await {
            return Resolution::Resolved(PriceQuote {
                date,
                price,
                source: QuoteSource::Cache,
            });
        }

        debug!("Fetching close price for {date}");
        match self.source.fetch_close(date).await {
            Ok(Some(price)) => {
                self.cache.put(date, price).await;
                Resolution::Resolved(PriceQuote {
                    date,
                    price,
                    source: QuoteSource::Fetched,
                })
            }
            Ok(None) => Resolution::NoData,
            Err(e) => Resolution::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::PriceStore;
    use crate::store::memory::MemoryStore;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockSource {
        closes: HashMap<NaiveDate, Decimal>,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for MockSource {
        async fn fetch_close(&self, date: NaiveDate) -> Result<Option<Decimal>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            Ok(self.closes.get(&date).copied())
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn resolver_with(source: MockSource) -> (PriceResolver, Arc<MockSource>, Arc<PriceCache>) {
        let source = Arc::new(source);
        let cache = Arc::new(PriceCache::load(Arc::new(MemoryStore::new())));
        let resolver = PriceResolver::new(
            Arc::clone(&source) as Arc<dyn PriceSource>,
            Arc::clone(&cache),
        );
        (resolver, source, cache)
    }

    #[tokio::test]
    async fn test_second_resolve_hits_cache_not_network() {
        let (resolver, source, _) = resolver_with(MockSource {
            closes: HashMap::from([(date("2024-01-01"), dec!(52.4))]),
            ..Default::default()
        });

        let first = resolver.resolve(date("2024-01-01")).await;
        assert!(matches!(
            first,
            Resolution::Resolved(PriceQuote {
                source: QuoteSource::Fetched,
                ..
            })
        ));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        let second = resolver.resolve(date("2024-01-01")).await;
        match second {
            Resolution::Resolved(quote) => {
                assert_eq!(quote.price, dec!(52.4));
                assert_eq!(quote.source, QuoteSource::Cache);
            }
            other => panic!("Expected a resolved quote, got {other:?}"),
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_preloaded_cache_skips_fetch_entirely() {
        let store = Arc::new(MemoryStore::new());
        store.save(date("2024-01-02"), dec!(60)).unwrap();

        let source = Arc::new(MockSource::default());
        let cache = Arc::new(PriceCache::load(
            Arc::clone(&store) as Arc<dyn PriceStore>
        ));
        let resolver = PriceResolver::new(
            Arc::clone(&source) as Arc<dyn PriceSource>,
            cache,
        );

        let resolution = resolver.resolve(date("2024-01-02")).await;
        match resolution {
            Resolution::Resolved(quote) => {
                assert_eq!(quote.price, dec!(60));
                assert_eq!(quote.source, QuoteSource::Cache);
            }
            other => panic!("Expected a resolved quote, got {other:?}"),
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_data_is_not_cached() {
        let (resolver, source, cache) = resolver_with(MockSource::default());

        assert!(matches!(
            resolver.resolve(date("2024-01-01")).await,
            Resolution::NoData
        ));
        assert!(matches!(
            resolver.resolve(date("2024-01-01")).await,
            Resolution::NoData
        ));

        // Both calls went out; nothing was written back.
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_cached() {
        let (resolver, source, cache) = resolver_with(MockSource {
            fail: true,
            ..Default::default()
        });

        match resolver.resolve(date("2024-01-01")).await {
            Resolution::Failed(e) => assert!(e.to_string().contains("connection refused")),
            other => panic!("Expected a failure, got {other:?}"),
        }
        assert!(matches!(
            resolver.resolve(date("2024-01-01")).await,
            Resolution::Failed(_)
        ));

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_fetched_price_is_written_through() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockSource {
            closes: HashMap::from([(date("2024-01-01"), dec!(52.4))]),
            ..Default::default()
        });
        let cache = Arc::new(PriceCache::load(
            Arc::clone(&store) as Arc<dyn PriceStore>
        ));
        let resolver = PriceResolver::new(
            Arc::clone(&source) as Arc<dyn PriceSource>,
            cache,
        );

        resolver.resolve(date("2024-01-01")).await;

        let persisted = store.load().unwrap();
        assert_eq!(persisted.get(&date("2024-01-01")), Some(&dec!(52.4)));
    }
}
