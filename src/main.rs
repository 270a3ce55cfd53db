use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use ledgerval::core::ledger::DateRange;
use ledgerval::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Value the configured ledgers and display the report
    Report {
        /// Inclusive start date (YYYY-MM-DD or DD/MM/YYYY)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Inclusive end date (YYYY-MM-DD or DD/MM/YYYY)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .map_err(|_| format!("Invalid date: {raw} (expected YYYY-MM-DD or DD/MM/YYYY)"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => ledgerval::cli::setup::run(),
        Some(Commands::Report { from, to }) => match DateRange::new(from, to) {
            Ok(range) => {
                ledgerval::run_command(
                    ledgerval::AppCommand::Report { range },
                    cli.config_path.as_deref(),
                )
                .await
            }
            Err(e) => Err(e),
        },
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
