pub mod cli;
pub mod core;
pub mod ingest;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::ledger::DateRange;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Report { range: DateRange },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Ledger valuation starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Report { range } => cli::report::run(&config, range).await,
    }
}
