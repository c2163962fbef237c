//! Error types for pulse-core

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error type shared by every pipeline stage
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An expected input artifact does not exist
    #[error("File not found: {0}")]
    MissingFile(String),

    /// A table lacks a column the stage depends on
    #[error("Column '{column}' not found in {table}")]
    MissingColumn {
        column: String,
        table: String,
    },

    /// Nothing left to work with
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Upstream API returned a non-success status or an unexpected payload
    #[error("{provider} API error: {reason}")]
    UpstreamApi {
        provider: String,
        reason: String,
    },

    /// Date or timestamp that could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Environment variable referenced by the configuration is not set
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// Shorthand for [`PipelineError::MissingColumn`]
    pub fn missing_column(column: impl Into<String>, table: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            table: table.into(),
        }
    }

    /// Shorthand for [`PipelineError::UpstreamApi`]
    pub fn upstream(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpstreamApi {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::missing_column("description", "raw/Apple_news.csv");
        assert_eq!(
            err.to_string(),
            "Column 'description' not found in raw/Apple_news.csv"
        );

        let err = PipelineError::upstream("NewsAPI", "apiKeyInvalid");
        assert_eq!(err.to_string(), "NewsAPI API error: apiKeyInvalid");

        let err = PipelineError::EmptyDataset("no merged rows".to_string());
        assert_eq!(err.to_string(), "Empty dataset: no merged rows");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PipelineError = io.into();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
