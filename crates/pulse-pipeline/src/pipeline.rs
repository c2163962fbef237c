//! Stage sequencing

use crate::evaluate::Evaluator;
use crate::preprocess::Preprocessor;
use crate::sentiment::SentimentScorer;
use crate::train::{TrainOptions, Trainer};
use pulse_collector::Collector;
use pulse_core::{PipelineConfig, Result, Stage, StageReport, TableStore};
use pulse_nlp::TextProcessor;
use std::sync::Arc;

/// An ordered list of stages run one after another against one store
///
/// A stage returning `Err` stops the run. Per-subject failures recorded in a
/// stage's report are logged and do not.
///
/// # Example
///
/// ```no_run
/// use pulse_core::{FsTableStore, PipelineConfig};
/// use pulse_pipeline::Pipeline;
///
/// # async fn example() -> pulse_core::Result<()> {
/// let config = PipelineConfig::builder().build()?;
/// let pipeline = Pipeline::from_config(&config)?;
/// let store = FsTableStore::new(&config.data_dir);
/// let reports = pipeline.run(&store).await?;
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// All five stages, collection through evaluation
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::from_config_with(config, TextProcessor::english())
    }

    /// All five stages sharing the given text processor
    pub fn from_config_with(config: &PipelineConfig, processor: TextProcessor) -> Result<Self> {
        let options = TrainOptions::from(config);
        Ok(Self::builder()
            .add_stage(Arc::new(Collector::from_config(config)?))
            .add_stage(Arc::new(Preprocessor::new(
                processor.clone(),
                config.companies.clone(),
            )))
            .add_stage(Arc::new(SentimentScorer::new(processor)))
            .add_stage(Arc::new(Trainer::new(options)))
            .add_stage(Arc::new(Evaluator::new(options)))
            .build())
    }

    /// Stage names in run order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self, store: &dyn TableStore) -> Result<Vec<StageReport>> {
        let mut reports = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            tracing::info!("Running stage {}", stage.name());
            let report = stage.run(store).await.inspect_err(|e| {
                tracing::error!("Stage {} failed: {e}", stage.name());
            })?;

            for failure in &report.failures {
                tracing::warn!("{}: {failure}", report.stage);
            }
            tracing::info!("{}", report.summary());
            reports.push(report);
        }

        Ok(reports)
    }
}

/// Builder for [`Pipeline`]
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Arc<dyn Stage>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pulse_core::{Company, DataArea, FsTableStore, MemoryTableStore, PipelineError};

    struct Failing;

    #[async_trait]
    impl Stage for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn run(&self, _store: &dyn TableStore) -> Result<StageReport> {
            Err(PipelineError::EmptyDataset("nothing".to_string()))
        }
    }

    fn seeded_raw_store() -> MemoryTableStore {
        let store = MemoryTableStore::new();
        store.insert_csv(
            DataArea::Raw,
            "AAPL_stock_data.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-01,1,1,1,100,100,10\n\
             2024-01-02,1,1,1,104,104,10\n\
             2024-01-03,1,1,1,110,110,10\n\
             2024-01-04,1,1,1,,,10\n",
        );
        store.insert_csv(
            DataArea::Raw,
            "Apple_news.csv",
            "source,title,description,publishedAt\n\
             Reuters,a,Apple shares crash after terrible results,2024-01-01T12:00:00Z\n\
             Reuters,b,Apple reports quarterly results,2024-01-02T12:00:00Z\n\
             Reuters,c,Apple stock surges on great earnings,2024-01-03T12:00:00Z\n",
        );
        store
    }

    fn offline_pipeline() -> Pipeline {
        let processor = TextProcessor::english();
        Pipeline::builder()
            .add_stage(Arc::new(Preprocessor::new(
                processor.clone(),
                vec![Company::new("Apple", "AAPL")],
            )))
            .add_stage(Arc::new(SentimentScorer::new(processor)))
            .add_stage(Arc::new(Trainer::default()))
            .add_stage(Arc::new(Evaluator::default()))
            .build()
    }

    #[tokio::test]
    async fn test_offline_stages_run_end_to_end() {
        let store = seeded_raw_store();
        let pipeline = offline_pipeline();
        assert_eq!(pipeline.stage_names(), vec!["preprocess", "sentiment", "train", "evaluate"]);

        let reports = pipeline.run(&store).await.unwrap();
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(StageReport::is_clean));
        assert!(reports[..3].iter().all(|r| r.output.is_none()));
        assert!(reports[3].output.is_some());

        assert!(store.exists(DataArea::Processed, "AAPL_stock_data.csv"));
        assert!(store.exists(DataArea::ProcessedWithSentiment, "Apple_news.csv"));
        let comparison = store.read(DataArea::Evaluation, "actual_vs_predicted.csv").unwrap();
        assert_eq!(comparison.len(), 3);
    }

    #[tokio::test]
    async fn test_offline_stages_on_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let seeded = seeded_raw_store();
        let store = FsTableStore::new(dir.path());
        for name in ["AAPL_stock_data.csv", "Apple_news.csv"] {
            let table = seeded.read(DataArea::Raw, name).unwrap();
            store.write(DataArea::Raw, name, &table).unwrap();
        }

        offline_pipeline().run(&store).await.unwrap();

        assert!(dir.path().join("processed/AAPL_stock_data.csv").is_file());
        assert!(dir.path().join("processed_with_sentiment/Apple_news.csv").is_file());
        assert!(dir.path().join("evaluation/actual_vs_predicted.csv").is_file());
    }

    #[tokio::test]
    async fn test_rerun_is_byte_identical() {
        let store = seeded_raw_store();
        let pipeline = offline_pipeline();

        pipeline.run(&store).await.unwrap();
        let first = store.csv(DataArea::Evaluation, "actual_vs_predicted.csv");
        pipeline.run(&store).await.unwrap();
        assert_eq!(first, store.csv(DataArea::Evaluation, "actual_vs_predicted.csv"));
    }

    #[tokio::test]
    async fn test_failing_stage_stops_the_run() {
        let store = seeded_raw_store();
        let pipeline = Pipeline::builder()
            .add_stage(Arc::new(Failing))
            .add_stage(Arc::new(Preprocessor::new(
                TextProcessor::english(),
                vec![Company::new("Apple", "AAPL")],
            )))
            .build();

        assert!(pipeline.run(&store).await.is_err());
        assert!(!store.exists(DataArea::Processed, "AAPL_stock_data.csv"));
    }

    #[test]
    fn test_from_config_builds_all_stages() {
        let config = PipelineConfig::builder()
            .news_api_key("test-key")
            .build()
            .unwrap();
        let pipeline = Pipeline::from_config(&config).unwrap();
        assert_eq!(
            pipeline.stage_names(),
            vec!["collect", "preprocess", "sentiment", "train", "evaluate"]
        );
    }
}
