//! Raw data collection stage
//!
//! For every company the collector fetches the price history of its ticker
//! and the news matching its name, and writes both to the raw area. A failure
//! for one company or one source is logged and recorded; it never stops the
//! rest of the batch.

use crate::error::{CollectorError, Result};
use crate::news_api::NewsApiClient;
use crate::source::{NewsArticle, NewsSource, PriceSource};
use crate::yahoo::YahooPriceSource;
use async_trait::async_trait;
use chrono::NaiveDate;
use pulse_core::store::{news_file_name, stock_file_name};
use pulse_core::{Company, DataArea, PipelineConfig, PriceRecord, Stage, StageReport, TableStore};
use serde::Serialize;
use std::sync::Arc;

/// What happened while collecting one company
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub company: String,
    pub ticker: String,
    /// Price rows fetched
    pub price_rows: usize,
    /// Articles fetched
    pub articles: usize,
    /// Locations of tables written
    pub written: Vec<String>,
    /// Errors encountered, one line each
    pub errors: Vec<String>,
}

impl CollectionReport {
    fn new(company: &Company) -> Self {
        Self {
            company: company.name.clone(),
            ticker: company.ticker.clone(),
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Collector stage
pub struct Collector {
    prices: Arc<dyn PriceSource>,
    news: Option<Arc<dyn NewsSource>>,
    companies: Vec<Company>,
    start: NaiveDate,
    end: NaiveDate,
}

impl Collector {
    /// Create a collector over explicit sources
    ///
    /// Without a news source only prices are collected.
    pub fn new(
        prices: Arc<dyn PriceSource>,
        news: Option<Arc<dyn NewsSource>>,
        companies: Vec<Company>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            prices,
            news,
            companies,
            start,
            end,
        }
    }

    /// Yahoo Finance prices and NewsAPI news as configured
    ///
    /// A missing NewsAPI key is logged and disables news collection.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let news: Option<Arc<dyn NewsSource>> = match NewsApiClient::from_config(config) {
            Ok(client) => Some(Arc::new(client)),
            Err(CollectorError::MissingApiKey(var)) => {
                tracing::warn!("No news API key ({var}); news will not be collected");
                None
            },
            Err(e) => return Err(e),
        };

        Ok(Self::new(
            Arc::new(YahooPriceSource::from_config(config)),
            news,
            config.companies.clone(),
            config.start_date,
            config.effective_end_date(),
        ))
    }

    /// Fetch and store the price table of a ticker, returning its row count
    pub async fn collect_prices(&self, store: &dyn TableStore, ticker: &str) -> Result<usize> {
        let records = self.prices.fetch_prices(ticker, self.start, self.end).await?;
        let table = PriceRecord::to_table(&records)?;
        let name = stock_file_name(ticker);
        store.write(DataArea::Raw, &name, &table)?;
        tracing::info!(
            "Stock data for {ticker} saved to {}",
            store.location(DataArea::Raw, &name)
        );
        Ok(records.len())
    }

    /// Fetch and store the news table of a company
    ///
    /// Returns the number of articles; nothing is written when there are none.
    pub async fn collect_news(
        &self,
        store: &dyn TableStore,
        source: &dyn NewsSource,
        company: &str,
    ) -> Result<usize> {
        let articles = source.fetch_articles(company, self.start, self.end).await?;
        if articles.is_empty() {
            tracing::warn!("No news data collected for {company}");
            return Ok(0);
        }

        let table = NewsArticle::to_table(&articles)?;
        let name = news_file_name(company);
        store.write(DataArea::Raw, &name, &table)?;
        tracing::info!(
            "News data for {company} saved to {}",
            store.location(DataArea::Raw, &name)
        );
        Ok(articles.len())
    }

    /// Collect both tables of one company
    pub async fn collect_company(
        &self,
        store: &dyn TableStore,
        company: &Company,
    ) -> CollectionReport {
        tracing::info!("Collecting data for {} ({})...", company.name, company.ticker);
        let mut report = CollectionReport::new(company);

        match self.collect_prices(store, &company.ticker).await {
            Ok(rows) => {
                report.price_rows = rows;
                report
                    .written
                    .push(store.location(DataArea::Raw, &stock_file_name(&company.ticker)));
            },
            Err(e) => {
                tracing::error!("Failed to collect prices for {}: {e}", company.ticker);
                report.errors.push(format!("{}: {e}", company.ticker));
            },
        }

        if let Some(news) = &self.news {
            match self.collect_news(store, news.as_ref(), &company.name).await {
                Ok(0) => {},
                Ok(count) => {
                    report.articles = count;
                    report
                        .written
                        .push(store.location(DataArea::Raw, &news_file_name(&company.name)));
                },
                Err(e) => {
                    tracing::error!("Error fetching news for {}: {e}", company.name);
                    report.errors.push(format!("{}: {e}", company.name));
                },
            }
        }

        report
    }

    /// Collect every configured company, one after the other
    pub async fn collect_all(&self, store: &dyn TableStore) -> Vec<CollectionReport> {
        let mut reports = Vec::with_capacity(self.companies.len());
        for company in &self.companies {
            reports.push(self.collect_company(store, company).await);
        }
        reports
    }
}

#[async_trait]
impl Stage for Collector {
    fn name(&self) -> &str {
        "collect"
    }

    async fn run(&self, store: &dyn TableStore) -> pulse_core::Result<StageReport> {
        let mut stage_report = StageReport::new(self.name());
        for report in self.collect_all(store).await {
            stage_report.written.extend(report.written);
            stage_report.failures.extend(report.errors);
        }
        Ok(stage_report)
    }
}
