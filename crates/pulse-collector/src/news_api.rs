//! NewsAPI client for company news

use crate::error::{CollectorError, Result};
use crate::source::{NewsArticle, NewsSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use pulse_core::PipelineConfig;
use pulse_core::config::{DEFAULT_NEWS_BASE_URL, NEWS_API_KEY_ENV};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const PROVIDER: &str = "NewsAPI";

/// Largest page NewsAPI serves
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    total_results: Option<u64>,
    articles: Option<Vec<RawArticle>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    source: Option<RawSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

impl From<RawArticle> for NewsArticle {
    fn from(raw: RawArticle) -> Self {
        Self {
            source: raw.source.and_then(|s| s.name),
            author: raw.author,
            title: raw.title,
            description: raw.description,
            url: raw.url,
            url_to_image: raw.url_to_image,
            published_at: raw.published_at,
            content: raw.content,
        }
    }
}

/// NewsAPI `/v2/everything` client
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    page_size: u32,
    max_pages: u32,
}

impl NewsApiClient {
    /// Create a client with default paging and no request timeout
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_NEWS_BASE_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            max_pages: 1,
        }
    }

    /// Create a client from the pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let api_key = config
            .news_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(CollectorError::MissingApiKey(NEWS_API_KEY_ENV))?;

        Self::new(api_key)
            .with_base_url(config.news_base_url.clone())
            .with_page_size(config.news_page_size)
            .with_max_pages(config.news_max_pages)
            .with_timeout(config.request_timeout())
    }

    /// Point the client at another host (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Articles per page, capped at [`MAX_PAGE_SIZE`]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Upper bound on pages fetched per query
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn everything_url(
        &self,
        query: &str,
        from: NaiveDate,
        to: NaiveDate,
        page: u32,
    ) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/v2/everything",
            self.base_url.trim_end_matches('/')
        ))?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("from", &from.format("%Y-%m-%d").to_string())
            .append_pair("to", &to.format("%Y-%m-%d").to_string())
            .append_pair("pageSize", &self.page_size.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("apiKey", &self.api_key);
        Ok(url)
    }

    /// Fetch one page, returning its articles and the reported total
    async fn fetch_page(
        &self,
        query: &str,
        from: NaiveDate,
        to: NaiveDate,
        page: u32,
    ) -> Result<(Vec<NewsArticle>, Option<u64>)> {
        let url = self.everything_url(query, from, to, page)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(CollectorError::Api {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let body: EverythingResponse =
            response
                .json()
                .await
                .map_err(|e| CollectorError::MalformedResponse {
                    provider: PROVIDER.to_string(),
                    reason: e.to_string(),
                })?;

        let articles = body.articles.ok_or_else(|| CollectorError::MalformedResponse {
            provider: PROVIDER.to_string(),
            reason: "response has no 'articles' field".to_string(),
        })?;

        Ok((
            articles.into_iter().map(NewsArticle::from).collect(),
            body.total_results,
        ))
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    /// Every page of a query, up to `max_pages`
    ///
    /// A failing first page is an error. A failing later page ends paging and
    /// the articles gathered so far are returned.
    async fn fetch_articles(
        &self,
        query: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsArticle>> {
        let mut articles = Vec::new();

        for page in 1..=self.max_pages {
            let (batch, total) = match self.fetch_page(query, from, to, page).await {
                Ok(result) => result,
                Err(e) if page > 1 => {
                    tracing::warn!(
                        "{PROVIDER} page {page} for '{query}' failed, keeping {} articles: {e}",
                        articles.len()
                    );
                    break;
                },
                Err(e) => return Err(e),
            };
            let short_page = batch.len() < self.page_size as usize;
            articles.extend(batch);

            tracing::debug!(
                "{PROVIDER} page {page} for '{query}': {} articles so far",
                articles.len()
            );

            let exhausted = total.is_some_and(|t| articles.len() as u64 >= t);
            if short_page || exhausted {
                break;
            }
        }

        Ok(articles)
    }
}
