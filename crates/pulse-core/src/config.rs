//! Configuration for pipeline runs
//!
//! Loaded from a JSON file (string values may reference `${VAR}` / `$VAR`
//! environment variables) or assembled with [`PipelineConfig::builder`].
//!
//! ```json
//! {
//!   "dataDir": "data",
//!   "companies": [{"name": "Apple", "ticker": "AAPL"}],
//!   "startDate": "2024-08-11",
//!   "newsApiKey": "${NEWS_API_KEY}"
//! }
//! ```

use crate::error::{PipelineError, Result};
use crate::records::Company;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the news API key
pub const NEWS_API_KEY_ENV: &str = "NEWS_API_KEY";

/// Default NewsAPI endpoint root
pub const DEFAULT_NEWS_BASE_URL: &str = "https://newsapi.org";

/// Configuration for a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Root of the raw/processed/... directories
    pub data_dir: PathBuf,

    /// Companies to collect and process, in order
    pub companies: Vec<Company>,

    /// First day of the collection window
    pub start_date: NaiveDate,

    /// Day after the collection window; today when unset
    pub end_date: Option<NaiveDate>,

    /// NewsAPI key
    pub news_api_key: Option<String>,

    /// NewsAPI endpoint root, overridable for testing
    pub news_base_url: String,

    /// Articles requested per page
    pub news_page_size: u32,

    /// Upper bound on pages fetched per company
    pub news_max_pages: u32,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Fraction of merged rows held out for scoring
    pub test_size: f64,

    /// Seed of the train/test shuffle
    pub random_seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            companies: default_companies(),
            start_date: NaiveDate::from_ymd_opt(2024, 8, 11).unwrap_or_default(),
            end_date: None,
            news_api_key: None,
            news_base_url: DEFAULT_NEWS_BASE_URL.to_string(),
            news_page_size: 100,
            news_max_pages: 1,
            request_timeout_secs: 30,
            test_size: 0.2,
            random_seed: 42,
        }
    }
}

/// The five companies tracked out of the box
pub fn default_companies() -> Vec<Company> {
    [
        ("Apple", "AAPL"),
        ("Tesla", "TSLA"),
        ("Microsoft", "MSFT"),
        ("Amazon", "AMZN"),
        ("Google", "GOOGL"),
    ]
    .into_iter()
    .map(|(name, ticker)| Company::new(name, ticker))
    .collect()
}

impl PipelineConfig {
    /// Create a new configuration builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;

        let mut config: PipelineConfig = serde_json::from_str(&content).map_err(|e| {
            PipelineError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;

        config.resolve_env_vars()?;
        Ok(config)
    }

    /// Fill the news API key from the environment when it is not set
    pub fn with_env_api_key(mut self) -> Self {
        if self.news_api_key.is_none() {
            if let Ok(key) = std::env::var(NEWS_API_KEY_ENV) {
                self.news_api_key = Some(key);
            }
        }
        self
    }

    /// Expand environment references in string fields
    pub fn resolve_env_vars(&mut self) -> Result<()> {
        let data_dir = resolve_env_string(&self.data_dir.to_string_lossy())?;
        self.data_dir = PathBuf::from(data_dir);
        self.news_base_url = resolve_env_string(&self.news_base_url)?;
        if let Some(key) = &self.news_api_key {
            self.news_api_key = Some(resolve_env_string(key)?);
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let end = self.effective_end_date();
        if end <= self.start_date {
            let end = match self.end_date {
                Some(_) => end.to_string(),
                None => format!("{end} (today)"),
            };
            return Err(PipelineError::ConfigError(format!(
                "end date {end} must be after start date {}",
                self.start_date
            )));
        }

        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PipelineError::ConfigError(
                "test_size must be between 0 and 1".to_string(),
            ));
        }

        if self.news_page_size == 0 || self.news_max_pages == 0 {
            return Err(PipelineError::ConfigError(
                "news_page_size and news_max_pages must be greater than 0".to_string(),
            ));
        }

        if self.companies.iter().any(|c| c.name.trim().is_empty() || c.ticker.trim().is_empty()) {
            return Err(PipelineError::ConfigError(
                "every company needs a name and a ticker".to_string(),
            ));
        }

        Ok(())
    }

    /// End of the collection window, defaulting to today
    pub fn effective_end_date(&self) -> NaiveDate {
        self.end_date.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    data_dir: Option<PathBuf>,
    companies: Option<Vec<Company>>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    news_api_key: Option<String>,
    news_base_url: Option<String>,
    news_page_size: Option<u32>,
    news_max_pages: Option<u32>,
    request_timeout_secs: Option<u64>,
    test_size: Option<f64>,
    random_seed: Option<u64>,
}

impl PipelineConfigBuilder {
    /// Set the data root
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Set the tracked companies
    pub fn companies(mut self, companies: Vec<Company>) -> Self {
        self.companies = Some(companies);
        self
    }

    /// Set the first collection day
    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Set the (exclusive) last collection day
    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Set the news API key
    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    /// Set the news endpoint root
    pub fn news_base_url(mut self, url: impl Into<String>) -> Self {
        self.news_base_url = Some(url.into());
        self
    }

    /// Set the news page size
    pub fn news_page_size(mut self, size: u32) -> Self {
        self.news_page_size = Some(size);
        self
    }

    /// Set the maximum number of news pages
    pub fn news_max_pages(mut self, pages: u32) -> Self {
        self.news_max_pages = Some(pages);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout_secs = Some(duration.as_secs());
        self
    }

    /// Set the holdout fraction
    pub fn test_size(mut self, fraction: f64) -> Self {
        self.test_size = Some(fraction);
        self
    }

    /// Set the shuffle seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Load the news API key from the environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var(NEWS_API_KEY_ENV) {
            self.news_api_key = Some(key);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        let defaults = PipelineConfig::default();

        let config = PipelineConfig {
            data_dir: self.data_dir.unwrap_or(defaults.data_dir),
            companies: self.companies.unwrap_or(defaults.companies),
            start_date: self.start_date.unwrap_or(defaults.start_date),
            end_date: self.end_date,
            news_api_key: self.news_api_key,
            news_base_url: self.news_base_url.unwrap_or(defaults.news_base_url),
            news_page_size: self.news_page_size.unwrap_or(defaults.news_page_size),
            news_max_pages: self.news_max_pages.unwrap_or(defaults.news_max_pages),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            test_size: self.test_size.unwrap_or(defaults.test_size),
            random_seed: self.random_seed.unwrap_or(defaults.random_seed),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Resolve environment variable references in strings
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn resolve_env_string(s: &str) -> Result<String> {
    let re = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .map_err(|e| PipelineError::ConfigError(e.to_string()))?;

    let mut result = String::with_capacity(s.len());
    let mut last = 0;

    for cap in re.captures_iter(s) {
        let Some(whole) = cap.get(0) else { continue };
        let Some(name) = cap.get(1).or_else(|| cap.get(2)) else {
            continue;
        };
        let value = std::env::var(name.as_str())
            .map_err(|_| PipelineError::EnvVarNotFound(name.as_str().to_string()))?;

        result.push_str(&s[last..whole.start()]);
        result.push_str(&value);
        last = whole.end();
    }

    result.push_str(&s[last..]);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.companies.len(), 5);
        assert_eq!(config.companies[0], Company::new("Apple", "AAPL"));
        assert_eq!(config.random_seed, 42);
        assert!((config.test_size - 0.2).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::builder()
            .data_dir("/tmp/pulse")
            .companies(vec![Company::new("Tesla", "TSLA")])
            .news_max_pages(3)
            .request_timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/pulse"));
        assert_eq!(config.companies.len(), 1);
        assert_eq!(config.news_max_pages, 3);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let start = NaiveDate::from_ymd_opt(2024, 8, 11).unwrap();
        assert!(
            PipelineConfig::builder()
                .start_date(start)
                .end_date(start)
                .build()
                .is_err()
        );
        assert!(PipelineConfig::builder().test_size(1.5).build().is_err());
        assert!(PipelineConfig::builder().news_page_size(0).build().is_err());
        assert!(
            PipelineConfig::builder()
                .companies(vec![Company::new("", "AAPL")])
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_validation_rejects_future_start_without_end() {
        let future = NaiveDate::from_ymd_opt(2999, 1, 1).unwrap();
        let err = PipelineConfig::builder().start_date(future).build().unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(ref msg) if msg.contains("(today)")));

        let config = PipelineConfig::builder()
            .start_date(future)
            .end_date(NaiveDate::from_ymd_opt(2999, 2, 1).unwrap())
            .build()
            .unwrap();
        assert_eq!(config.effective_end_date(), NaiveDate::from_ymd_opt(2999, 2, 1).unwrap());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "dataDir": "store",
                "companies": [{{"name": "Amazon", "ticker": "AMZN"}}],
                "startDate": "2024-09-01",
                "endDate": "2024-10-01",
                "newsApiKey": "plain-key"
            }}"#
        )
        .unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("store"));
        assert_eq!(config.companies, vec![Company::new("Amazon", "AMZN")]);
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2024, 10, 1));
        assert_eq!(config.news_api_key.as_deref(), Some("plain-key"));
        // unspecified fields keep their defaults
        assert_eq!(config.news_page_size, 100);
    }

    #[test]
    fn test_from_file_missing() {
        let err = PipelineConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(_)));
    }

    #[test]
    fn test_resolve_env_string() {
        let path = std::env::var("PATH").unwrap_or_default();
        if !path.is_empty() {
            assert_eq!(
                resolve_env_string("a:${PATH}:b").unwrap(),
                format!("a:{path}:b")
            );
            assert_eq!(resolve_env_string("$PATH").unwrap(), path);
        }
        assert_eq!(resolve_env_string("no vars").unwrap(), "no vars");

        let err = resolve_env_string("${PULSE_SURELY_UNSET_VARIABLE_123}").unwrap_err();
        assert!(matches!(err, PipelineError::EnvVarNotFound(_)));
    }
}
