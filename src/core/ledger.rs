//! Transaction model and date-range filtering

use anyhow::{Result, bail};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Withdrawal,
    Deposit,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Withdrawal => write!(f, "Withdrawals"),
            TransactionKind::Deposit => write!(f, "Deposits"),
        }
    }
}

/// A dated ledger entry. The adapter normalizes dates to UTC calendar days
/// and coerces amounts; a row whose amount did not parse keeps `None` so the
/// valuation can count it as skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: Option<Decimal>,
    pub kind: TransactionKind,
}

/// Inclusive date bounds. An absent start means unbounded past, an absent
/// end unbounded future.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Builds a range, rejecting an end date before the start date.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                bail!("End date {end} is before start date {start}");
            }
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }

    /// Human-readable label for report headings.
    pub fn label(&self) -> String {
        match (self.start, self.end) {
            (None, None) => "all time".to_string(),
            (Some(start), None) => format!("since {start}"),
            (None, Some(end)) => format!("until {end}"),
            (Some(start), Some(end)) => format!("{start} to {end}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let range = DateRange::new(Some(date("2024-01-01")), Some(date("2024-01-31"))).unwrap();

        assert!(range.contains(date("2024-01-01")));
        assert!(range.contains(date("2024-01-31")));
        assert!(range.contains(date("2024-01-15")));
        assert!(!range.contains(date("2023-12-31")));
        assert!(!range.contains(date("2024-02-01")));
    }

    #[test]
    fn test_open_ended_ranges() {
        let unbounded = DateRange::default();
        assert!(unbounded.contains(date("1970-01-01")));
        assert!(unbounded.contains(date("2999-12-31")));

        let from = DateRange::new(Some(date("2024-01-01")), None).unwrap();
        assert!(!from.contains(date("2023-12-31")));
        assert!(from.contains(date("2025-06-01")));

        let until = DateRange::new(None, Some(date("2024-01-01"))).unwrap();
        assert!(until.contains(date("2023-12-31")));
        assert!(!until.contains(date("2024-01-02")));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let result = DateRange::new(Some(date("2024-02-01")), Some(date("2024-01-01")));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("before start date"));
    }

    #[test]
    fn test_range_label() {
        assert_eq!(DateRange::default().label(), "all time");
        assert_eq!(
            DateRange::new(Some(date("2024-01-01")), None).unwrap().label(),
            "since 2024-01-01"
        );
        assert_eq!(
            DateRange::new(None, Some(date("2024-03-01"))).unwrap().label(),
            "until 2024-03-01"
        );
        assert_eq!(
            DateRange::new(Some(date("2024-01-01")), Some(date("2024-03-01")))
                .unwrap()
                .label(),
            "2024-01-01 to 2024-03-01"
        );
    }
}
