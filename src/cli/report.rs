use super::ui;
use crate::core::cache::{PriceCache, PriceStore};
use crate::core::config::AppConfig;
use crate::core::ledger::{DateRange, Transaction};
use crate::core::price::PriceSource;
use crate::core::resolver::PriceResolver;
use crate::core::valuation::{ValuationReport, value_ledger};
use crate::ingest;
use crate::providers::retry::RetryingSource;
use crate::providers::tradermade::TradermadeProvider;
use crate::store::{DiskStore, MemoryStore};
use anyhow::{Context, Result, bail};
use comfy_table::Cell;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const RETRY_DELAY: Duration = Duration::from_millis(500);

impl ValuationReport {
    pub fn display_as_table(&self, currency: &str, range_label: &str) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Category"),
            ui::header_cell(&format!("Total ({currency})")),
        ]);

        for (kind, total) in &self.totals {
            table.add_row(vec![
                Cell::new(kind.to_string()),
                ui::amount_cell(format!("{total:.2}")),
            ]);
        }

        let mut output = format!(
            "Valuation: {}\n\n",
            ui::style_text(range_label, ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        match self.profit_loss {
            Some(profit_loss) => {
                let style_type = if profit_loss >= Decimal::ZERO {
                    ui::StyleType::Gain
                } else {
                    ui::StyleType::Loss
                };
                output.push_str(&format!(
                    "\n\nProfit/Loss ({}): {}",
                    ui::style_text(currency, ui::StyleType::TotalLabel),
                    ui::style_text(&format!("{profit_loss:.2}"), style_type)
                ));
            }
            None => {
                output.push_str(&format!("\n\nProfit/Loss ({currency}): N/A"));
            }
        }

        if self.skipped > 0 {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!(
                        "{} transaction(s) skipped (no usable price or amount)",
                        self.skipped
                    ),
                    ui::StyleType::Warning
                )
            ));
        }

        output
    }
}

pub async fn run(config: &AppConfig, range: DateRange) -> Result<()> {
    let tradermade = config
        .providers
        .tradermade
        .as_ref()
        .context("No price provider configured")?;
    if tradermade.api_key.is_empty() {
        bail!("Tradermade API key is not set; run `ledgerval setup` and edit the config");
    }

    let store = open_store(config);
    let cache = Arc::new(PriceCache::load(store));
    debug!("Price cache holds {} entries", cache.len().await);

    let provider = TradermadeProvider::new(&tradermade.base_url, &tradermade.api_key, &config.pair)?;
    let source: Arc<dyn PriceSource> = if tradermade.retries > 0 {
        Arc::new(RetryingSource::new(
            Arc::new(provider),
            tradermade.retries,
            RETRY_DELAY,
        ))
    } else {
        Arc::new(provider)
    };
    let resolver = PriceResolver::new(source, Arc::clone(&cache));

    let mut transactions: Vec<Transaction> = Vec::new();
    let mut ledger_warnings: Vec<String> = Vec::new();
    for ledger in &config.ledgers {
        match ingest::csv::read_ledger(Path::new(&ledger.path), ledger.kind) {
            Ok(mut rows) => transactions.append(&mut rows),
            Err(e) => {
                warn!("Skipping ledger {}: {e:#}", ledger.path);
                ledger_warnings.push(format!("Skipped ledger {}: {e:#}", ledger.path));
            }
        }
    }

    let pb = ui::new_progress_bar(0, true);
    pb.set_message("Resolving prices...");
    let report = value_ledger(&transactions, &range, &resolver, pb.clone()).await;
    pb.finish_and_clear();

    println!("{}", report.display_as_table(&config.currency, &range.label()));

    if !ledger_warnings.is_empty() || !report.warnings.is_empty() {
        println!();
        for warning in &ledger_warnings {
            println!("{}", ui::style_text(warning, ui::StyleType::Warning));
        }
        for warning in &report.warnings {
            println!(
                "{}",
                ui::style_text(&warning.to_string(), ui::StyleType::Warning)
            );
        }
    }

    Ok(())
}

/// Opens the durable price store, degrading to in-memory-only when the disk
/// store cannot be opened.
fn open_store(config: &AppConfig) -> Arc<dyn PriceStore> {
    match config.cache_dir().and_then(|dir| DiskStore::open(&dir)) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Price cache store unavailable, running in-memory only: {e:#}");
            Arc::new(MemoryStore::new())
        }
    }
}
