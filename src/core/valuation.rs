//! Aggregation of a transaction stream into a valuation report

use crate::core::ledger::{DateRange, Transaction, TransactionKind};
use crate::core::resolver::{PriceResolver, Resolution};
use chrono::NaiveDate;
use futures::StreamExt;
use indicatif::ProgressBar;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use tracing::debug;

/// Bound on concurrent fetches when many dates miss the cache.
const MAX_CONCURRENT_RESOLUTIONS: usize = 4;

/// A per-date data problem that degraded the report. Both kinds skip the
/// affected transactions; the two causes are reported separately.
#[derive(Debug)]
pub enum ValuationWarning {
    MissingPrice { date: NaiveDate },
    SourceFailure { date: NaiveDate, message: String },
}

impl Display for ValuationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValuationWarning::MissingPrice { date } => {
                write!(f, "No market data for {date}; transactions skipped")
            }
            ValuationWarning::SourceFailure { date, message } => {
                write!(f, "Price lookup failed for {date}: {message}")
            }
        }
    }
}

/// Result of valuing one transaction stream over one date range.
///
/// `profit_loss` is present only when both transaction kinds contributed a
/// total. `skipped` counts transactions dropped for a missing price or a
/// missing amount, so partial results are never silent.
#[derive(Debug, Default)]
pub struct ValuationReport {
    pub totals: BTreeMap<TransactionKind, Decimal>,
    pub profit_loss: Option<Decimal>,
    pub skipped: usize,
    pub warnings: Vec<ValuationWarning>,
}

/// Values every transaction inside `range` at its date's close price.
///
/// Prices are resolved once per distinct date, concurrently up to
/// [`MAX_CONCURRENT_RESOLUTIONS`]; cache writes stay serialized inside the
/// cache. An unresolvable date degrades the report instead of aborting it.
pub async fn value_ledger(
    transactions: &[Transaction],
    range: &DateRange,
    resolver: &PriceResolver,
    pb: ProgressBar,
) -> ValuationReport {
    let mut report = ValuationReport::default();

    // Rows the adapter could not coerce to a number never reach pricing.
    let mut priced: Vec<(NaiveDate, Decimal, TransactionKind)> = Vec::new();
    for tx in transactions.iter().filter(|tx| range.contains(tx.date)) {
        match tx.amount {
            Some(amount) => priced.push((tx.date, amount, tx.kind)),
            None => report.skipped += 1,
        }
    }

    let dates: BTreeSet<NaiveDate> = priced.iter().map(|(date, _, _)| *date).collect();
    debug!(
        "Valuing {} transactions across {} distinct dates",
        priced.len(),
        dates.len()
    );
    pb.set_length(dates.len() as u64);

    let resolutions: BTreeMap<NaiveDate, Resolution> = futures::stream::iter(dates)
        .map(|date| {
            let pb = pb.clone();
            async move {
                let resolution = resolver.resolve(date).await;
                pb.inc(1);
                (date, resolution)
            }
        })
        .buffer_unordered(MAX_CONCURRENT_RESOLUTIONS)
        .collect()
        .await;

    for (date, resolution) in &resolutions {
        match resolution {
            Resolution::NoData => report
                .warnings
                .push(ValuationWarning::MissingPrice { date: *date }),
            Resolution::Failed(e) => report.warnings.push(ValuationWarning::SourceFailure {
                date: *date,
                message: format!("{e}"),
            }),
            Resolution::Resolved(_) => {}
        }
    }

    for (date, amount, kind) in priced {
        match resolutions.get(&date) {
            Some(Resolution::Resolved(quote)) => {
                let value = amount * quote.price;
                *report.totals.entry(kind).or_insert(Decimal::ZERO) += value;
            }
            _ => report.skipped += 1,
        }
    }

    if let (Some(withdrawals), Some(deposits)) = (
        report.totals.get(&TransactionKind::Withdrawal),
        report.totals.get(&TransactionKind::Deposit),
    ) {
        report.profit_loss = Some(*withdrawals - *deposits);
    }

    report
}
