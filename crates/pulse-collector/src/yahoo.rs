//! Yahoo Finance price source

use crate::error::{CollectorError, Result};
use crate::source::PriceSource;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use pulse_core::{PipelineConfig, PriceRecord};
use std::time::Duration;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Yahoo Finance daily history client
#[derive(Debug, Clone)]
pub struct YahooPriceSource {
    timeout: Duration,
}

impl Default for YahooPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooPriceSource {
    /// Create a new Yahoo Finance client with a 30 second request timeout
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a client using the configured request timeout
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new().with_timeout(config.request_timeout())
    }

    /// Per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn connector(&self) -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| CollectorError::YahooFinance(e.to_string()))
    }
}

/// Midnight UTC of a calendar day as the `time` crate's timestamp
fn day_start(date: NaiveDate) -> Result<OffsetDateTime> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CollectorError::InvalidDate(date.to_string()))?
        .and_utc();
    OffsetDateTime::from_unix_timestamp(midnight.timestamp())
        .map_err(|e| CollectorError::InvalidDate(format!("{date}: {e}")))
}

fn to_record(ticker: &str, quote: &yahoo::Quote) -> Option<PriceRecord> {
    let date = DateTime::from_timestamp(quote.timestamp as i64, 0)?.date_naive();
    Some(PriceRecord {
        ticker: ticker.to_string(),
        date,
        open: Some(quote.open),
        high: Some(quote.high),
        low: Some(quote.low),
        close: Some(quote.close),
        adj_close: Some(quote.adjclose),
        volume: Some(quote.volume as f64),
    })
}

#[async_trait]
impl PriceSource for YahooPriceSource {
    async fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceRecord>> {
        let provider = self.connector()?;

        let response = provider
            .get_quote_history(ticker, day_start(start)?, day_start(end)?)
            .await
            .map_err(|e| CollectorError::YahooFinance(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| CollectorError::YahooFinance(e.to_string()))?;

        let records: Vec<PriceRecord> =
            quotes.iter().filter_map(|q| to_record(ticker, q)).collect();
        tracing::debug!("Yahoo Finance returned {} rows for {ticker}", records.len());
        Ok(records)
    }
}
