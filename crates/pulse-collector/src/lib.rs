//! Raw data collection for pulse-rs
//!
//! Prices come from Yahoo Finance and news from NewsAPI, both behind the
//! [`PriceSource`] and [`NewsSource`] traits. The [`Collector`] stage writes
//! what they return to the raw area of a table store.

pub mod collector;
pub mod error;
pub mod news_api;
pub mod source;
pub mod yahoo;

pub use collector::{CollectionReport, Collector};
pub use error::{CollectorError, Result};
pub use news_api::NewsApiClient;
pub use source::{NewsArticle, NewsSource, PriceSource};
pub use yahoo::YahooPriceSource;
