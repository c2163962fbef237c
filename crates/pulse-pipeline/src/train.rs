//! Sentiment to closing price regression

use crate::merge::{MergedDataset, try_load_data};
use crate::regression::{LinearModel, RegressionMetrics};
use async_trait::async_trait;
use ndarray::Array1;
use pulse_core::{PipelineConfig, PipelineError, Result, Stage, StageReport, TableStore};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

/// Holdout split settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    /// Fraction of rows held out for scoring
    pub test_size: f64,
    /// Seed of the shuffle preceding the split
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
        }
    }
}

impl From<&PipelineConfig> for TrainOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            test_size: config.test_size,
            seed: config.random_seed,
        }
    }
}

/// A fitted model with its holdout scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainedModel {
    pub model: LinearModel,
    /// Scores on the held-out rows
    pub test_metrics: RegressionMetrics,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl TrainedModel {
    pub fn predict_one(&self, sentiment: f64) -> f64 {
        self.model.predict_one(sentiment)
    }
}

/// `(sentiment, close)` pairs of rows that have both
pub fn training_pairs(data: &MergedDataset) -> (Array1<f64>, Array1<f64>) {
    let (x, y): (Vec<f64>, Vec<f64>) = data
        .records
        .iter()
        .filter_map(|r| Some((r.sentiment()?, r.close()?)))
        .unzip();
    (Array1::from(x), Array1::from(y))
}

/// Shuffled `(train, test)` row indices; the test part has `ceil(test_size * n)` rows
pub fn split_indices(n: usize, options: TrainOptions) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(options.seed);
    indices.shuffle(&mut rng);

    let test_rows = ((options.test_size * n as f64).ceil() as usize).min(n);
    let train = indices.split_off(test_rows);
    (train, indices)
}

/// Fit `Close ~ sentiment` on a seeded holdout split
///
/// Rows missing either value are dropped first. Fewer than two remaining
/// rows leave nothing to train on and fail with `EmptyDataset`.
pub fn try_train_model(data: &MergedDataset, options: TrainOptions) -> Result<TrainedModel> {
    let (x, y) = training_pairs(data);
    if x.is_empty() {
        return Err(PipelineError::EmptyDataset(
            "no rows with both sentiment and Close".to_string(),
        ));
    }

    let (train, test) = split_indices(x.len(), options);
    if train.is_empty() || test.is_empty() {
        return Err(PipelineError::EmptyDataset(format!(
            "{} rows are too few for a train/test split",
            x.len()
        )));
    }

    let x_train = x.select(ndarray::Axis(0), &train);
    let y_train = y.select(ndarray::Axis(0), &train);
    let x_test = x.select(ndarray::Axis(0), &test);
    let y_test = y.select(ndarray::Axis(0), &test);

    let model = LinearModel::fit(&x_train, &y_train)?;
    let test_metrics = RegressionMetrics::calculate(&y_test, &model.predict(&x_test));

    tracing::info!("Model trained with R^2 score: {}", test_metrics.r2);
    tracing::info!("Mean Squared Error: {}", test_metrics.mse);
    tracing::info!("Mean Absolute Error: {}", test_metrics.mae);

    Ok(TrainedModel {
        model,
        test_metrics,
        train_rows: train.len(),
        test_rows: test.len(),
    })
}

/// Like [`try_train_model`], accepting a missing dataset and logging failures
pub fn train_model(data: Option<&MergedDataset>, options: TrainOptions) -> Option<TrainedModel> {
    let Some(data) = data.filter(|d| !d.is_empty()) else {
        tracing::error!("No data available to train the model");
        return None;
    };
    try_train_model(data, options)
        .inspect_err(|e| tracing::error!("Training failed: {e}"))
        .ok()
}

/// Merge and train stage
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    options: TrainOptions,
}

impl Trainer {
    pub fn new(options: TrainOptions) -> Self {
        Self { options }
    }

    /// Merge the stored tables and fit a model
    pub fn train(&self, store: &dyn TableStore) -> Result<(MergedDataset, TrainedModel)> {
        let data = try_load_data(store)?;
        let model = try_train_model(&data, self.options)?;
        Ok((data, model))
    }
}

#[async_trait]
impl Stage for Trainer {
    fn name(&self) -> &str {
        "train"
    }

    async fn run(&self, store: &dyn TableStore) -> Result<StageReport> {
        let (data, trained) = self.train(store)?;
        tracing::info!(
            "Fitted Close = {:.4} + {:.4} * sentiment on {} of {} merged rows",
            trained.model.intercept,
            trained.model.coefficient,
            trained.train_rows,
            data.len()
        );
        Ok(StageReport::new(self.name()))
    }
}
