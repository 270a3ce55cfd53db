use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::price::PriceSource;

const TIMESERIES_ENDPOINT: &str = "/api/v1/timeseries";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Daily close prices from the Tradermade timeseries API, scoped to one
/// currency pair.
pub struct TradermadeProvider {
    base_url: String,
    api_key: String,
    pair: String,
    client: reqwest::Client,
}

impl TradermadeProvider {
    pub fn new(base_url: &str, api_key: &str, pair: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("ledgerval/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(TradermadeProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            pair: pair.to_string(),
            client,
        })
    }
}

#[derive(Deserialize, Debug)]
struct TimeseriesResponse {
    quotes: Vec<TimeseriesQuote>,
}

#[derive(Deserialize, Debug)]
struct TimeseriesQuote {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    close: Option<Decimal>,
}

#[async_trait]
impl PriceSource for TradermadeProvider {
    #[instrument(
        name = "TradermadeFetch",
        skip(self),
        fields(pair = %self.pair, date = %date)
    )]
    async fn fetch_close(&self, date: NaiveDate) -> Result<Option<Decimal>> {
        let url = format!("{}{}", self.base_url, TIMESERIES_ENDPOINT);
        let date_str = date.to_string();
        debug!("Requesting daily close from {url}");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("currency", self.pair.as_str()),
                ("start_date", date_str.as_str()),
                ("end_date", date_str.as_str()),
                ("format", "records"),
                ("interval", "daily"),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {e} for {} on {date}", self.pair))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for {} on {date}",
                response.status(),
                self.pair
            ));
        }

        let text = response.text().await?;
        let data: TimeseriesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse timeseries response for {date}: {e}"))?;

        let Some(quote) = data.quotes.first() else {
            debug!("No quotes for {date}");
            return Ok(None);
        };
        let close = quote
            .close
            .ok_or_else(|| anyhow!("Quote without close price for {date}"))?;
        Ok(Some(close))
    }
}
