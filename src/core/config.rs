use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::core::ledger::TransactionKind;

pub const DEFAULT_TRADERMADE_URL: &str = "https://marketdata.tradermade.com";

/// One CSV ledger file and the transaction kind its rows carry.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LedgerSource {
    pub path: String,
    pub kind: TransactionKind,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TradermadeConfig {
    pub base_url: String,
    pub api_key: String,
    /// Extra fetch attempts on transport failure; 0 disables retries.
    #[serde(default)]
    pub retries: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub tradermade: Option<TradermadeConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            tradermade: Some(TradermadeConfig {
                base_url: DEFAULT_TRADERMADE_URL.to_string(),
                api_key: String::new(),
                retries: 0,
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub ledgers: Vec<LedgerSource>,
    /// Market symbol quoted by the price source, e.g. "LTCGBP".
    pub pair: String,
    /// Reporting currency label shown in the output.
    pub currency: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub cache_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "ledgerval")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    /// Directory for the durable price cache; `cache_path` overrides the
    /// platform data dir.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.cache_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "codito", "ledgerval")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("cache"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
