use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Durable backend for the price cache.
pub trait PriceStore: Send + Sync {
    fn load(&self) -> Result<BTreeMap<NaiveDate, Decimal>>;
    fn save(&self, date: NaiveDate, price: Decimal) -> Result<()>;
}

/// Date-keyed price cache over a durable store.
///
/// One price per date; once written, an entry is authoritative for the rest
/// of the run. Writes are serialized behind the mutex.
pub struct PriceCache {
    prices: Mutex<BTreeMap<NaiveDate, Decimal>>,
    store: Arc<dyn PriceStore>,
}

impl PriceCache {
    /// Loads cached prices from the store. An unreadable store yields an
    /// empty cache with a warning; it never fails the caller.
    pub fn load(store: Arc<dyn PriceStore>) -> Self {
        let prices = match store.load() {
            Ok(prices) => {
                debug!("Loaded {} cached prices", prices.len());
                prices
            }
            Err(e) => {
                warn!("Failed to load price cache, starting empty: {e}");
                BTreeMap::new()
            }
        };
        Self {
            prices: Mutex::new(prices),
            store,
        }
    }

    pub async fn get(&self, date: NaiveDate) -> Option<Decimal> {
        let prices = self.prices.lock().await;
        let value = prices.get(&date).copied();
        if value.is_some() {
            debug!("Cache HIT for {date}");
        } else {
            debug!("Cache MISS for {date}");
        }
        value
    }

    /// Inserts in memory, then persists the entry immediately. A persistence
    /// failure is reported but the price stays usable for the session.
    pub async fn put(&self, date: NaiveDate, price: Decimal) {
        let mut prices = self.prices.lock().await;
        prices.insert(date, price);
        debug!("Cache PUT for {date}");
        if let Err(e) = self.store.save(date, price) {
            warn!("Failed to persist price for {date}: {e}");
        }
    }

    pub async fn len(&self) -> usize {
        self.prices.lock().await.len()
    }
}
