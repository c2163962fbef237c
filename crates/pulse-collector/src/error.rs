//! Error types for data collection

use pulse_core::PipelineError;
use thiserror::Error;

/// Collection specific errors
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Provider answered with a non-success status
    #[error("{provider} API error {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    /// Provider answered 200 with a payload we cannot use
    #[error("Unexpected {provider} response: {reason}")]
    MalformedResponse { provider: String, reason: String },

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinance(String),

    /// No NewsAPI key configured
    #[error("NewsAPI key not configured (set {0})")]
    MissingApiKey(&'static str),

    /// Date outside the range a provider accepts
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed base URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Writing the collected tables failed
    #[error(transparent)]
    Store(#[from] PipelineError),
}

/// Result type alias for collection operations
pub type Result<T> = std::result::Result<T, CollectorError>;

impl From<CollectorError> for PipelineError {
    fn from(err: CollectorError) -> Self {
        match err {
            CollectorError::Api {
                provider,
                status,
                message,
            } => PipelineError::upstream(provider, format!("{status}: {message}")),
            CollectorError::MalformedResponse { provider, reason } => {
                PipelineError::upstream(provider, reason)
            }
            CollectorError::YahooFinance(reason) => {
                PipelineError::upstream("Yahoo Finance", reason)
            }
            CollectorError::Network(e) => PipelineError::upstream("HTTP", e.to_string()),
            CollectorError::InvalidDate(date) => PipelineError::InvalidDate(date),
            CollectorError::Store(e) => e,
            other => PipelineError::ConfigError(other.to_string()),
        }
    }
}
