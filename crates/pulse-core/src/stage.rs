//! Stage abstraction used by the pipeline runner

use crate::error::Result;
use crate::store::TableStore;
use async_trait::async_trait;
use serde::Serialize;

/// Outcome of one stage run
///
/// Failures are recorded per subject (company, ticker, file) so that one bad
/// input never hides the results of the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    /// Stage name
    pub stage: String,
    /// Locations of tables written
    pub written: Vec<String>,
    /// `subject: error` lines for inputs that could not be handled
    pub failures: Vec<String>,
    /// Human-readable result for the caller to show, if the stage has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl StageReport {
    /// Create an empty report for a stage
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Self::default()
        }
    }

    /// Record a table that was written
    pub fn record_written(&mut self, location: impl Into<String>) {
        self.written.push(location.into());
    }

    /// Record a failed subject
    pub fn record_failure(&mut self, subject: &str, error: impl std::fmt::Display) {
        self.failures.push(format!("{subject}: {error}"));
    }

    /// Attach a rendered result
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Fold another report's entries into this one
    pub fn absorb(&mut self, other: StageReport) {
        self.written.extend(other.written);
        self.failures.extend(other.failures);
    }

    /// True when nothing failed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{}: {} written, {} failed",
            self.stage,
            self.written.len(),
            self.failures.len()
        )
    }
}

/// A step of the pipeline
///
/// Stages communicate only through the store, so each one can be re-run on
/// its own as long as its inputs exist.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stage name, used in reports and logs
    fn name(&self) -> &str;

    /// Run the stage against a store
    async fn run(&self, store: &dyn TableStore) -> Result<StageReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_bookkeeping() {
        let mut report = StageReport::new("preprocess");
        assert!(report.is_clean());

        report.record_written("processed/AAPL_stock_data.csv");
        report.record_failure("Tesla", "File not found: raw/Tesla_news.csv");
        assert!(!report.is_clean());
        assert_eq!(report.summary(), "preprocess: 1 written, 1 failed");

        let mut other = StageReport::new("preprocess");
        other.record_written("processed/Apple_news.csv");
        report.absorb(other);
        assert_eq!(report.written.len(), 2);
        assert_eq!(
            report.failures,
            vec!["Tesla: File not found: raw/Tesla_news.csv".to_string()]
        );
        assert_eq!(report.output, None);
    }

    #[test]
    fn test_report_output() {
        let report = StageReport::new("evaluate").with_output("MSE 0.1");
        assert_eq!(report.output.as_deref(), Some("MSE 0.1"));
        assert!(report.is_clean());
    }
}
