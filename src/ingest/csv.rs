//! CSV ledger adapter: tabular exports in, typed transactions out

use crate::core::ledger::{Transaction, TransactionKind};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Zone name some exporters append after the numeric offset.
const UTC_ZONE_SUFFIX: &str = " (Coordinated Universal Time)";
const EXPORT_DATE_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

#[derive(Debug, Deserialize)]
struct LedgerRow {
    date: String,
    amount: String,
}

/// Parses an exporter date string into a UTC calendar date. Time of day is
/// discarded; pricing is daily.
fn parse_row_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::from_str(trimmed) {
        return Ok(date);
    }

    let stripped = trimmed.strip_suffix(UTC_ZONE_SUFFIX).unwrap_or(trimmed);
    let parsed = DateTime::parse_from_str(stripped, EXPORT_DATE_FORMAT)
        .with_context(|| format!("Unrecognized date: {raw}"))?;
    Ok(parsed.to_utc().date_naive())
}

/// Reads one ledger file into typed transactions, all tagged with `kind`.
///
/// Amounts that do not parse as numbers are kept as `None` so the valuation
/// can count them as skipped. A malformed date fails the whole file with row
/// context.
pub fn read_ledger(path: &Path, kind: TransactionKind) -> Result<Vec<Transaction>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open ledger file: {}", path.display()))?;

    let mut transactions = Vec::new();
    for (index, row) in reader.deserialize::<LedgerRow>().enumerate() {
        let row =
            row.with_context(|| format!("Malformed row {} in {}", index + 1, path.display()))?;
        let date = parse_row_date(&row.date)
            .with_context(|| format!("Row {} in {}", index + 1, path.display()))?;
        let amount = Decimal::from_str(row.amount.trim()).ok();
        transactions.push(Transaction { date, amount, kind });
    }

    debug!(
        "Read {} transactions from {}",
        transactions.len(),
        path.display()
    );
    Ok(transactions)
}
