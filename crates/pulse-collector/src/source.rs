//! Data source abstractions
//!
//! The collector only talks to these traits, so tests can swap the network
//! clients for mocks.

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use pulse_core::PriceRecord;
use pulse_core::records::NEWS_HEADER;
use serde::{Deserialize, Serialize};

/// Daily price history provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Daily rows for `ticker` from `start` (inclusive) to `end` (exclusive)
    async fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceRecord>>;
}

/// News search provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Articles matching `query` published between `from` and `to`
    async fn fetch_articles(
        &self,
        query: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsArticle>>;
}

/// A news article as delivered by the provider
///
/// Every field is optional because providers routinely omit them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Publisher name
    pub source: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    /// Timestamp exactly as the provider sent it
    pub published_at: Option<String>,
    pub content: Option<String>,
}

impl NewsArticle {
    /// Cells in [`NEWS_HEADER`] order, missing fields as empty cells
    pub fn to_row(&self) -> Vec<String> {
        [
            &self.source,
            &self.author,
            &self.title,
            &self.description,
            &self.url,
            &self.url_to_image,
            &self.published_at,
            &self.content,
        ]
        .into_iter()
        .map(|field| field.clone().unwrap_or_default())
        .collect()
    }

    /// Build a raw news table from articles
    pub fn to_table(articles: &[NewsArticle]) -> pulse_core::Result<pulse_core::Table> {
        let mut table = pulse_core::Table::new(NEWS_HEADER);
        for article in articles {
            table.push_row(article.to_row())?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_table_keeps_missing_fields_empty() {
        let article = NewsArticle {
            source: Some("Reuters".to_string()),
            title: Some("Apple, Inc. beats estimates".to_string()),
            published_at: Some("2024-08-12T14:00:00Z".to_string()),
            ..NewsArticle::default()
        };

        let table = NewsArticle::to_table(&[article]).unwrap();
        assert_eq!(
            table.to_csv_string().unwrap(),
            "source,author,title,description,url,urlToImage,publishedAt,content\n\
             Reuters,,\"Apple, Inc. beats estimates\",,,,2024-08-12T14:00:00Z,\n"
        );
    }
}
