use crate::core::config::AppConfig;
use anyhow::{Context, Result};

const DEFAULT_CONFIG: &str = r#"---
ledgers:
  - path: "Crypto Withdrawals.csv"
    kind: withdrawal
  - path: "Crypto Deposits.csv"
    kind: deposit

pair: "LTCGBP"
currency: "GBP"

providers:
  tradermade:
    base_url: "https://marketdata.tradermade.com"
    api_key: ""
    retries: 0
"#;

pub fn run() -> Result<()> {
    let path = AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
