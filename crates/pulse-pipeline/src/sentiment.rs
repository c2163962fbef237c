//! Sentiment scoring stage

use async_trait::async_trait;
use pulse_core::records::columns;
use pulse_core::store::NEWS_FILE_SUFFIX;
use pulse_core::{DataArea, Result, Stage, StageReport, Table, TableStore};
use pulse_nlp::TextProcessor;

/// Add a `sentiment` column to a processed news table and write it to the
/// processed_with_sentiment area
///
/// `name` is the table's file name, e.g. `Apple_news.csv`. Missing or empty
/// cleaned text scores 0.0.
pub fn try_analyze_sentiment(
    store: &dyn TableStore,
    processor: &TextProcessor,
    name: &str,
) -> Result<Table> {
    let mut table = store.read(DataArea::Processed, name)?;
    let cleaned =
        table.require_column(columns::CLEANED_TEXT, &store.location(DataArea::Processed, name))?;

    let scores: Vec<String> = (0..table.len())
        .map(|row| processor.score(table.cell(row, cleaned)).to_string())
        .collect();
    table.set_column(columns::SENTIMENT, scores)?;

    store.write(DataArea::ProcessedWithSentiment, name, &table)?;
    tracing::info!(
        "Sentiment analysis complete. File saved to {}",
        store.location(DataArea::ProcessedWithSentiment, name)
    );
    Ok(table)
}

/// Like [`try_analyze_sentiment`], logging the error instead of returning it
pub fn analyze_sentiment(
    store: &dyn TableStore,
    processor: &TextProcessor,
    name: &str,
) -> Option<Table> {
    try_analyze_sentiment(store, processor, name)
        .inspect_err(|e| tracing::error!("Failed to score {name}: {e}"))
        .ok()
}

/// Scores every news table of the processed area
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    processor: TextProcessor,
}

impl SentimentScorer {
    pub fn new(processor: TextProcessor) -> Self {
        Self { processor }
    }

    /// Score all processed news tables in name order
    pub fn score_all(&self, store: &dyn TableStore) -> Result<StageReport> {
        let mut report = StageReport::new(self.name());

        let names: Vec<String> = store
            .list(DataArea::Processed)?
            .into_iter()
            .filter(|name| name.ends_with(NEWS_FILE_SUFFIX))
            .collect();
        if names.is_empty() {
            tracing::warn!("No processed news tables to score");
        }

        for name in names {
            match try_analyze_sentiment(store, &self.processor, &name) {
                Ok(_) => {
                    report.record_written(store.location(DataArea::ProcessedWithSentiment, &name));
                },
                Err(e) => {
                    tracing::error!("Failed to score {name}: {e}");
                    report.record_failure(&name, e);
                },
            }
        }

        Ok(report)
    }
}

#[async_trait]
impl Stage for SentimentScorer {
    fn name(&self) -> &str {
        "sentiment"
    }

    async fn run(&self, store: &dyn TableStore) -> Result<StageReport> {
        self.score_all(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{MemoryTableStore, PipelineError};

    const PROCESSED_NEWS: &str = "title,description,publishedAt,cleaned_text\n\
        Up,Great results,2024-01-02T10:00:00Z,great result\n\
        Down,Terrible quarter,2024-01-02T11:00:00Z,terrible quarter\n\
        Blank,,2024-01-03T10:00:00Z,\n";

    fn sentiments(table: &Table) -> Vec<f64> {
        table
            .column("sentiment")
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().parse::<f64>().unwrap())
            .collect()
    }

    #[test]
    fn test_analyze_sentiment_adds_scores() {
        let store = MemoryTableStore::new();
        store.insert_csv(DataArea::Processed, "Apple_news.csv", PROCESSED_NEWS);

        let table =
            try_analyze_sentiment(&store, &TextProcessor::english(), "Apple_news.csv").unwrap();
        let scores = sentiments(&table);

        assert!(scores[0] > 0.0);
        assert!(scores[1] < 0.0);
        // empty cleaned text -> neutral
        assert_eq!(scores[2], 0.0);
        assert!(scores.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(store.exists(DataArea::ProcessedWithSentiment, "Apple_news.csv"));
    }

    #[test]
    fn test_analyze_sentiment_requires_cleaned_text() {
        let store = MemoryTableStore::new();
        store.insert_csv(DataArea::Processed, "Apple_news.csv", "title,description\nUp,Good\n");

        let err = try_analyze_sentiment(&store, &TextProcessor::english(), "Apple_news.csv")
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { .. }));
        assert!(!store.exists(DataArea::ProcessedWithSentiment, "Apple_news.csv"));
        assert!(analyze_sentiment(&store, &TextProcessor::english(), "Apple_news.csv").is_none());
    }

    #[test]
    fn test_score_all_skips_price_tables_and_reports_failures() {
        let store = MemoryTableStore::new();
        store.insert_csv(DataArea::Processed, "Apple_news.csv", PROCESSED_NEWS);
        store.insert_csv(DataArea::Processed, "Tesla_news.csv", "title\nx\n");
        store.insert_csv(DataArea::Processed, "AAPL_stock_data.csv", "date,Close\n2024-01-02,1\n");

        let report = SentimentScorer::new(TextProcessor::english())
            .score_all(&store)
            .unwrap();

        assert_eq!(report.written.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].starts_with("Tesla_news.csv: "));
        assert_eq!(store.list(DataArea::ProcessedWithSentiment).unwrap(), vec!["Apple_news.csv"]);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let store = MemoryTableStore::new();
        store.insert_csv(DataArea::Processed, "Apple_news.csv", PROCESSED_NEWS);
        let scorer = SentimentScorer::new(TextProcessor::english());

        scorer.score_all(&store).unwrap();
        let first = store.csv(DataArea::ProcessedWithSentiment, "Apple_news.csv");
        scorer.score_all(&store).unwrap();
        assert_eq!(first, store.csv(DataArea::ProcessedWithSentiment, "Apple_news.csv"));
    }
}
