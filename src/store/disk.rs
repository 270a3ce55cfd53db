use crate::core::cache::PriceStore;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

const PRICES_PARTITION: &str = "prices";

/// Price store backed by a fjall keyspace on disk.
///
/// One entry per calendar date: ISO date bytes as the key, the decimal
/// rendered as a string as the value. Single-writer, single-process use.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create cache directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open cache store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PRICES_PARTITION, PartitionCreateOptions::default())
            .context("Failed to open price partition")?;

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl PriceStore for DiskStore {
    fn load(&self) -> Result<BTreeMap<NaiveDate, Decimal>> {
        let mut prices = BTreeMap::new();
        for entry in self.partition.iter() {
            let (key, value) = entry.context("Failed to read cache entry")?;
            let date = std::str::from_utf8(&key)
                .ok()
                .and_then(|s| NaiveDate::from_str(s).ok());
            let price = std::str::from_utf8(&value)
                .ok()
                .and_then(|s| Decimal::from_str(s).ok());
            match (date, price) {
                (Some(date), Some(price)) => {
                    prices.insert(date, price);
                }
                _ => warn!("Skipping undecodable cache entry"),
            }
        }
        debug!("Loaded {} prices from disk cache", prices.len());
        Ok(prices)
    }

    fn save(&self, date: NaiveDate, price: Decimal) -> Result<()> {
        self.partition
            .insert(date.to_string(), price.to_string())?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}
