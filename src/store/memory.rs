use crate::core::cache::PriceStore;
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-memory price store, used by tests and as the fallback when the disk
/// store cannot be opened.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<NaiveDate, Decimal>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PriceStore for MemoryStore {
    fn load(&self) -> Result<BTreeMap<NaiveDate, Decimal>> {
        Ok(self.entries.lock().unwrap().clone())
    }

    fn save(&self, date: NaiveDate, price: Decimal) -> Result<()> {
        self.entries.lock().unwrap().insert(date, price);
        Ok(())
    }
}
