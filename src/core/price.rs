//! Pricing abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Where a resolved price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSource {
    Cache,
    Fetched,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub date: NaiveDate,
    pub price: Decimal,
    pub source: QuoteSource,
}

/// A market-data capability scoped to one fixed currency pair for the
/// session.
///
/// `Ok(Some(price))` carries the daily close, `Ok(None)` means the source
/// has no data for that date (e.g. exchange closed), and `Err` is a
/// transport failure: timeout, non-2xx status, malformed payload.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_close(&self, date: NaiveDate) -> Result<Option<Decimal>>;
}
