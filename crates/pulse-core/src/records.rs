//! Typed views over pipeline tables

use crate::dates::{format_date, join_date, price_date};
use crate::error::{PipelineError, Result};
use crate::table::Table;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column names shared by the stages
pub mod columns {
    /// Canonical date column written by the preprocessor
    pub const DATE: &str = "date";
    /// Date column as produced by the price feed
    pub const RAW_DATE: &str = "Date";
    /// Intraday variant some price exports use
    pub const RAW_DATETIME: &str = "Datetime";
    pub const OPEN: &str = "Open";
    pub const HIGH: &str = "High";
    pub const LOW: &str = "Low";
    pub const CLOSE: &str = "Close";
    pub const ADJ_CLOSE: &str = "Adj Close";
    pub const VOLUME: &str = "Volume";

    pub const SOURCE: &str = "source";
    pub const AUTHOR: &str = "author";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const URL: &str = "url";
    pub const URL_TO_IMAGE: &str = "urlToImage";
    pub const PUBLISHED_AT: &str = "publishedAt";
    pub const CONTENT: &str = "content";

    /// Added by the preprocessor
    pub const CLEANED_TEXT: &str = "cleaned_text";
    /// Added by the sentiment scorer
    pub const SENTIMENT: &str = "sentiment";
}

/// Header of a raw price table
pub const PRICE_HEADER: [&str; 7] = [
    columns::RAW_DATE,
    columns::OPEN,
    columns::HIGH,
    columns::LOW,
    columns::CLOSE,
    columns::ADJ_CLOSE,
    columns::VOLUME,
];

/// Header of a raw news table
pub const NEWS_HEADER: [&str; 8] = [
    columns::SOURCE,
    columns::AUTHOR,
    columns::TITLE,
    columns::DESCRIPTION,
    columns::URL,
    columns::URL_TO_IMAGE,
    columns::PUBLISHED_AT,
    columns::CONTENT,
];

/// A company whose news is searched and whose ticker is priced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Name used as the news query and news file prefix
    pub name: String,
    /// Ticker used for the price feed and price file prefix
    pub ticker: String,
}

impl Company {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

/// One trading day of one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
}

impl PriceRecord {
    /// Cells in [`PRICE_HEADER`] order
    pub fn to_row(&self) -> Vec<String> {
        vec![
            format_date(self.date),
            fmt_opt(self.open),
            fmt_opt(self.high),
            fmt_opt(self.low),
            fmt_opt(self.close),
            fmt_opt(self.adj_close),
            fmt_opt(self.volume),
        ]
    }

    /// Build a raw price table from records
    pub fn to_table(records: &[PriceRecord]) -> Result<Table> {
        let mut table = Table::new(PRICE_HEADER);
        for record in records {
            table.push_row(record.to_row())?;
        }
        Ok(table)
    }
}

/// One article of one company, reduced to what the merge needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub company: String,
    /// Publication time truncated to the UTC calendar day
    pub date: NaiveDate,
    pub title: Option<String>,
    pub description: Option<String>,
    pub cleaned_text: Option<String>,
    pub sentiment: Option<f64>,
}

/// A price row paired with an article published on the same day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub date: NaiveDate,
    pub price: PriceRecord,
    pub article: ArticleRecord,
}

impl MergedRecord {
    pub fn close(&self) -> Option<f64> {
        self.price.close
    }

    pub fn sentiment(&self) -> Option<f64> {
        self.article.sentiment
    }
}

/// Records decoded from a table plus the number of rows that were discarded
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}

/// Locate the date column of a price table, accepting the raw spellings
pub fn price_date_column(table: &Table) -> Option<usize> {
    [columns::DATE, columns::RAW_DATE, columns::RAW_DATETIME]
        .iter()
        .find_map(|name| table.column_index(name))
}

/// Locate the date column of a news table
pub fn news_date_column(table: &Table) -> Option<usize> {
    [columns::DATE, columns::PUBLISHED_AT]
        .iter()
        .find_map(|name| table.column_index(name))
}

/// Decode price rows, dropping rows whose date is unusable
pub fn decode_prices(
    table: &Table,
    ticker: &str,
    table_name: &str,
) -> Result<Decoded<PriceRecord>> {
    let date_idx = price_date_column(table)
        .ok_or_else(|| PipelineError::missing_column(columns::DATE, table_name))?;

    let numeric = |name: &str, row: usize| -> Option<f64> {
        table
            .column_index(name)
            .and_then(|idx| table.cell(row, idx))
            .and_then(|v| v.trim().parse::<f64>().ok())
    };

    let mut records = Vec::with_capacity(table.len());
    let mut dropped = 0;

    for row in 0..table.len() {
        let Some(date) = table.cell(row, date_idx).and_then(price_date) else {
            dropped += 1;
            continue;
        };

        records.push(PriceRecord {
            ticker: ticker.to_string(),
            date,
            open: numeric(columns::OPEN, row),
            high: numeric(columns::HIGH, row),
            low: numeric(columns::LOW, row),
            close: numeric(columns::CLOSE, row),
            adj_close: numeric(columns::ADJ_CLOSE, row),
            volume: numeric(columns::VOLUME, row),
        });
    }

    Ok(Decoded { records, dropped })
}

/// Decode scored news rows, dropping rows whose timestamp is unusable
pub fn decode_articles(
    table: &Table,
    company: &str,
    table_name: &str,
) -> Result<Decoded<ArticleRecord>> {
    let date_idx = news_date_column(table)
        .ok_or_else(|| PipelineError::missing_column(columns::DATE, table_name))?;

    let text = |name: &str, row: usize| -> Option<String> {
        table
            .column_index(name)
            .and_then(|idx| table.cell(row, idx))
            .map(ToString::to_string)
    };

    let mut records = Vec::with_capacity(table.len());
    let mut dropped = 0;

    for row in 0..table.len() {
        let Some(date) = table.cell(row, date_idx).and_then(join_date) else {
            dropped += 1;
            continue;
        };

        records.push(ArticleRecord {
            company: company.to_string(),
            date,
            title: text(columns::TITLE, row),
            description: text(columns::DESCRIPTION, row),
            cleaned_text: text(columns::CLEANED_TEXT, row),
            sentiment: text(columns::SENTIMENT, row).and_then(|v| v.trim().parse::<f64>().ok()),
        });
    }

    Ok(Decoded { records, dropped })
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
