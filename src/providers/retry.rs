use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::core::price::PriceSource;

/// Bounded retry around a price source (total runs = 1 initial + retries).
///
/// Only transport failures are retried; an empty-data answer is final.
/// Enabled via the provider's `retries` configuration.
pub struct RetryingSource {
    inner: Arc<dyn PriceSource>,
    retries: usize,
    delay: Duration,
}

impl RetryingSource {
    pub fn new(inner: Arc<dyn PriceSource>, retries: usize, delay: Duration) -> Self {
        Self {
            inner,
            retries,
            delay,
        }
    }
}

#[async_trait]
impl PriceSource for RetryingSource {
    async fn fetch_close(&self, date: NaiveDate) -> Result<Option<Decimal>> {
        let mut attempt = 1;
        loop {
            match self.inner.fetch_close(date).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt > self.retries {
                        return Err(err);
                    }
                    debug!(
                        "Attempt {}/{} failed for {}: {}. Retrying...",
                        attempt,
                        self.retries + 1,
                        date,
                        err
                    );
                    attempt += 1;
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakySource {
        failures_before_success: usize,
        calls: AtomicUsize,
        close: Option<Decimal>,
    }

    #[async_trait]
    impl PriceSource for FlakySource {
        async fn fetch_close(&self, _date: NaiveDate) -> Result<Option<Decimal>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                return Err(anyhow!("connection reset"));
            }
            Ok(self.close)
        }
    }

    fn date() -> NaiveDate {
        "2024-01-01".parse().unwrap()
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let source = Arc::new(FlakySource {
            failures_before_success: 2,
            calls: AtomicUsize::new(0),
            close: Some(dec!(52.4)),
        });
        let retrying = RetryingSource::new(
            Arc::clone(&source) as Arc<dyn PriceSource>,
            2,
            Duration::ZERO,
        );

        let result = retrying.fetch_close(date()).await.unwrap();
        assert_eq!(result, Some(dec!(52.4)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries_exhausted() {
        let source = Arc::new(FlakySource {
            failures_before_success: usize::MAX,
            calls: AtomicUsize::new(0),
            close: None,
        });
        let retrying = RetryingSource::new(
            Arc::clone(&source) as Arc<dyn PriceSource>,
            1,
            Duration::ZERO,
        );

        let result = retrying.fetch_close(date()).await;
        assert!(result.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_data_is_final_not_retried() {
        let source = Arc::new(FlakySource {
            failures_before_success: 0,
            calls: AtomicUsize::new(0),
            close: None,
        });
        let retrying = RetryingSource::new(
            Arc::clone(&source) as Arc<dyn PriceSource>,
            3,
            Duration::ZERO,
        );

        let result = retrying.fetch_close(date()).await.unwrap();
        assert_eq!(result, None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
