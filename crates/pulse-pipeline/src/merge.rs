//! Price/news merge
//!
//! Every processed price table and every scored news table is loaded in file
//! name order, reduced to typed records keyed by calendar day, and the two
//! sides are inner-joined on that day. The join is many-to-many: each price
//! row pairs with each article published on its day.

use chrono::NaiveDate;
use pulse_core::records::{self, ArticleRecord, Decoded, PriceRecord, columns};
use pulse_core::store::{NEWS_FILE_SUFFIX, STOCK_FILE_SUFFIX};
use pulse_core::{DataArea, MergedRecord, PipelineError, Result, TableStore};
use std::collections::BTreeMap;

/// Inner join of all prices and all scored articles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedDataset {
    pub records: Vec<MergedRecord>,
    /// Price rows loaded before the join
    pub price_rows: usize,
    /// Article rows loaded before the join
    pub article_rows: usize,
}

impl MergedDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last merged day
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }
}

/// Strip a file suffix to recover the ticker or company
fn subject(name: &str, suffix: &str) -> String {
    name.strip_suffix(suffix).unwrap_or(name).to_string()
}

fn log_range<T>(label: &str, items: &[T], date: impl Fn(&T) -> NaiveDate) {
    let first = items.iter().map(&date).min();
    let last = items.iter().map(&date).max();
    if let (Some(first), Some(last)) = (first, last) {
        tracing::info!("{label} date range: {first} to {last}");
    }
}

/// Load, normalize and join everything the upstream stages produced
///
/// A table that cannot be read or decoded is logged and skipped. Fails with
/// `EmptyDataset` when either side has no usable rows, and with
/// `MissingColumn` when no price table carries `Close` or no news table
/// carries `sentiment`.
pub fn try_load_data(store: &dyn TableStore) -> Result<MergedDataset> {
    let mut prices: Vec<PriceRecord> = Vec::new();
    let mut has_close = false;

    for name in store.list(DataArea::Processed)? {
        if !name.ends_with(STOCK_FILE_SUFFIX) {
            continue;
        }
        let location = store.location(DataArea::Processed, &name);
        tracing::info!("Loading stock data from: {location}");

        let table = match store.read(DataArea::Processed, &name) {
            Ok(table) => table,
            Err(e) => {
                tracing::error!("Skipping {location}: {e}");
                continue;
            },
        };
        match records::decode_prices(&table, &subject(&name, STOCK_FILE_SUFFIX), &location) {
            Ok(Decoded { records, dropped }) => {
                if dropped > 0 {
                    tracing::warn!("Dropped {dropped} rows with unusable dates from {location}");
                }
                has_close |= table.has_column(columns::CLOSE);
                prices.extend(records);
            },
            Err(e) => tracing::error!("Skipping {location}: {e}"),
        }
    }

    let mut articles: Vec<ArticleRecord> = Vec::new();
    let mut has_sentiment = false;

    for name in store.list(DataArea::ProcessedWithSentiment)? {
        if !name.ends_with(NEWS_FILE_SUFFIX) {
            continue;
        }
        let location = store.location(DataArea::ProcessedWithSentiment, &name);
        tracing::info!("Loading sentiment data from: {location}");

        let table = match store.read(DataArea::ProcessedWithSentiment, &name) {
            Ok(table) => table,
            Err(e) => {
                tracing::error!("Skipping {location}: {e}");
                continue;
            },
        };
        match records::decode_articles(&table, &subject(&name, NEWS_FILE_SUFFIX), &location) {
            Ok(Decoded { records, dropped }) => {
                if dropped > 0 {
                    tracing::warn!("Dropped {dropped} rows with unusable dates from {location}");
                }
                has_sentiment |= table.has_column(columns::SENTIMENT);
                articles.extend(records);
            },
            Err(e) => tracing::error!("Skipping {location}: {e}"),
        }
    }

    tracing::info!("Combined stock rows: {}", prices.len());
    tracing::info!("Combined sentiment rows: {}", articles.len());
    log_range("Stock data", &prices, |p| p.date);
    log_range("Sentiment data", &articles, |a| a.date);

    if prices.is_empty() || articles.is_empty() {
        return Err(PipelineError::EmptyDataset(
            "one or both of the datasets are empty".to_string(),
        ));
    }
    if !has_sentiment {
        return Err(PipelineError::missing_column(columns::SENTIMENT, "merged data"));
    }
    if !has_close {
        return Err(PipelineError::missing_column(columns::CLOSE, "merged data"));
    }

    let records = inner_join(&prices, &articles);
    tracing::info!("Data merged successfully. Total rows: {}", records.len());

    Ok(MergedDataset {
        records,
        price_rows: prices.len(),
        article_rows: articles.len(),
    })
}

/// Like [`try_load_data`], logging the error instead of returning it
pub fn load_data(store: &dyn TableStore) -> Option<MergedDataset> {
    try_load_data(store)
        .inspect_err(|e| tracing::error!("Failed to load merged data: {e}"))
        .ok()
}

/// Pair every price row with every article of the same day
///
/// Output follows price order, then article order within a day.
pub fn inner_join(prices: &[PriceRecord], articles: &[ArticleRecord]) -> Vec<MergedRecord> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&ArticleRecord>> = BTreeMap::new();
    for article in articles {
        by_day.entry(article.date).or_default().push(article);
    }

    let mut merged = Vec::new();
    for price in prices {
        let Some(day_articles) = by_day.get(&price.date) else {
            continue;
        };
        for article in day_articles {
            merged.push(MergedRecord {
                date: price.date,
                price: price.clone(),
                article: (*article).clone(),
            });
        }
    }
    merged
}
