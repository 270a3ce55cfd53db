//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod ledger;
pub mod log;
pub mod price;
pub mod resolver;
pub mod valuation;

// Re-export main types for cleaner imports
pub use cache::{PriceCache, PriceStore};
pub use ledger::{DateRange, Transaction, TransactionKind};
pub use price::{PriceQuote, PriceSource, QuoteSource};
pub use resolver::{PriceResolver, Resolution};
pub use valuation::{ValuationReport, ValuationWarning, value_ledger};
