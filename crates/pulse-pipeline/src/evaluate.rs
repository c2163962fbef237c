//! Model evaluation against the full merged dataset

use crate::merge::MergedDataset;
use crate::regression::mean_squared_error;
use crate::train::{TrainOptions, Trainer, TrainedModel};
use async_trait::async_trait;
use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table as TextTable};
use ndarray::Array1;
use pulse_core::{DataArea, PipelineError, Result, Stage, StageReport, Table, TableStore};
use serde::Serialize;

/// File name of the actual vs. predicted series in the evaluation area
pub const COMPARISON_FILE: &str = "actual_vs_predicted.csv";

/// One merged row: observed close and the model's estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

/// Result of scoring a model on every usable merged row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub mse: f64,
    /// Points in date order
    pub points: Vec<ComparisonPoint>,
}

impl Evaluation {
    /// `date,actual,predicted` table of the points
    pub fn to_table(&self) -> Result<Table> {
        let mut table = Table::new(vec![
            "date".to_string(),
            "actual".to_string(),
            "predicted".to_string(),
        ]);
        for p in &self.points {
            table.push_row(vec![
                p.date.to_string(),
                p.actual.to_string(),
                p.predicted.to_string(),
            ])?;
        }
        Ok(table)
    }

    /// Terminal rendering of the comparison
    pub fn render(&self) -> String {
        let mut table = TextTable::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Date", "Actual Close", "Predicted Close"]);
        for p in &self.points {
            table.add_row(vec![
                p.date.to_string(),
                format!("{:.2}", p.actual),
                format!("{:.2}", p.predicted),
            ]);
        }
        format!("{table}\nMean Squared Error on full dataset: {:.4}", self.mse)
    }
}

/// Predict every merged row carrying both sentiment and close
///
/// Each prediction stays paired with its own row; only then are the pairs
/// sorted by date (stable, so same-day rows keep merge order).
pub fn try_evaluate_model(model: &TrainedModel, data: &MergedDataset) -> Result<Evaluation> {
    let mut points: Vec<ComparisonPoint> = data
        .records
        .iter()
        .filter_map(|r| {
            let (sentiment, actual) = (r.sentiment()?, r.close()?);
            Some(ComparisonPoint {
                date: r.date,
                actual,
                predicted: model.predict_one(sentiment),
            })
        })
        .collect();
    if points.is_empty() {
        return Err(PipelineError::EmptyDataset(
            "no rows with both sentiment and Close to evaluate".to_string(),
        ));
    }
    points.sort_by_key(|p| p.date);

    let actual: Array1<f64> = points.iter().map(|p| p.actual).collect();
    let predicted: Array1<f64> = points.iter().map(|p| p.predicted).collect();
    let mse = mean_squared_error(&actual, &predicted);
    tracing::info!("Mean Squared Error on full dataset: {mse}");

    Ok(Evaluation { mse, points })
}

/// Like [`try_evaluate_model`], accepting missing inputs and logging failures
pub fn evaluate_model(
    model: Option<&TrainedModel>,
    data: Option<&MergedDataset>,
) -> Option<Evaluation> {
    let (Some(model), Some(data)) = (model, data) else {
        tracing::error!("Model or data not available for evaluation");
        return None;
    };
    try_evaluate_model(model, data)
        .inspect_err(|e| tracing::error!("Evaluation failed: {e}"))
        .ok()
}

/// Merge, train and evaluate, writing the comparison table
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    trainer: Trainer,
}

impl Evaluator {
    pub fn new(options: TrainOptions) -> Self {
        Self {
            trainer: Trainer::new(options),
        }
    }

    pub fn evaluate(&self, store: &dyn TableStore) -> Result<Evaluation> {
        let (data, model) = self.trainer.train(store)?;
        try_evaluate_model(&model, &data)
    }
}

#[async_trait]
impl Stage for Evaluator {
    fn name(&self) -> &str {
        "evaluate"
    }

    async fn run(&self, store: &dyn TableStore) -> Result<StageReport> {
        let evaluation = self.evaluate(store)?;
        store.write(DataArea::Evaluation, COMPARISON_FILE, &evaluation.to_table()?)?;

        let mut report = StageReport::new(self.name()).with_output(evaluation.render());
        report.record_written(store.location(DataArea::Evaluation, COMPARISON_FILE));
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::{LinearModel, RegressionMetrics};
    use pulse_core::{ArticleRecord, MemoryTableStore, MergedRecord, PriceRecord};

    fn record(d: u32, sentiment: f64, close: f64) -> MergedRecord {
        let date = NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        MergedRecord {
            date,
            price: PriceRecord {
                ticker: "AAPL".to_string(),
                date,
                open: None,
                high: None,
                low: None,
                close: Some(close),
                adj_close: None,
                volume: None,
            },
            article: ArticleRecord {
                company: "Apple".to_string(),
                date,
                title: None,
                description: None,
                cleaned_text: None,
                sentiment: Some(sentiment),
            },
        }
    }

    fn model(intercept: f64, coefficient: f64) -> TrainedModel {
        TrainedModel {
            model: LinearModel {
                coefficient,
                intercept,
            },
            test_metrics: RegressionMetrics {
                r2: f64::NAN,
                mse: 0.0,
                mae: 0.0,
                n_samples: 1,
            },
            train_rows: 1,
            test_rows: 1,
        }
    }

    #[test]
    fn test_predictions_stay_paired_after_sorting() {
        let data = MergedDataset {
            records: vec![record(3, 1.0, 30.0), record(1, -1.0, 10.0), record(2, 0.0, 20.0)],
            price_rows: 3,
            article_rows: 3,
        };
        // close = 20 + 10 * sentiment fits every row exactly
        let evaluation = try_evaluate_model(&model(20.0, 10.0), &data).unwrap();

        let dates: Vec<u32> =
            evaluation.points.iter().map(|p| chrono::Datelike::day(&p.date)).collect();
        assert_eq!(dates, vec![1, 2, 3]);
        assert!(evaluation.points.iter().all(|p| (p.actual - p.predicted).abs() < 1e-12));
        assert!(evaluation.mse.abs() < 1e-12);
    }

    #[test]
    fn test_mse_over_full_dataset() {
        let data = MergedDataset {
            records: vec![record(1, 0.0, 10.0), record(2, 0.0, 14.0)],
            price_rows: 2,
            article_rows: 2,
        };
        let evaluation = try_evaluate_model(&model(12.0, 0.0), &data).unwrap();
        assert!((evaluation.mse - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_inputs() {
        assert!(evaluate_model(None, None).is_none());
        let empty = MergedDataset::default();
        assert!(evaluate_model(Some(&model(0.0, 0.0)), Some(&empty)).is_none());
    }

    #[test]
    fn test_comparison_table_and_render() {
        let evaluation = Evaluation {
            mse: 0.25,
            points: vec![ComparisonPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                actual: 10.5,
                predicted: 10.0,
            }],
        };
        let table = evaluation.to_table().unwrap();
        assert_eq!(table.to_csv_string().unwrap(), "date,actual,predicted\n2024-01-02,10.5,10\n");

        let rendered = evaluation.render();
        assert!(rendered.contains("2024-01-02"));
        assert!(rendered.contains("10.50"));
        assert!(rendered.contains("0.2500"));
    }

    #[test]
    fn test_stage_writes_comparison_file() {
        let store = MemoryTableStore::new();
        store.insert_csv(
            DataArea::Processed,
            "AAPL_stock_data.csv",
            "date,Close\n2024-01-01,10\n2024-01-02,12\n2024-01-03,14\n",
        );
        store.insert_csv(
            DataArea::ProcessedWithSentiment,
            "Apple_news.csv",
            "publishedAt,sentiment\n\
             2024-01-01T09:00:00Z,-0.5\n\
             2024-01-02T09:00:00Z,0.0\n\
             2024-01-03T09:00:00Z,0.5\n",
        );

        let report = tokio_test::block_on(Evaluator::default().run(&store)).unwrap();
        assert_eq!(report.written.len(), 1);
        let output = report.output.as_deref().unwrap();
        assert!(output.contains("Mean Squared Error on full dataset:"));
        assert!(output.contains("2024-01-03"));

        let written = store.read(DataArea::Evaluation, COMPARISON_FILE).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(written.headers().to_vec(), vec!["date", "actual", "predicted"]);
    }

    #[test]
    fn test_stage_fails_without_data() {
        let store = MemoryTableStore::new();
        let result = tokio_test::block_on(Evaluator::default().run(&store));
        assert!(matches!(result, Err(PipelineError::EmptyDataset(_))));
        assert!(!store.exists(DataArea::Evaluation, COMPARISON_FILE));
    }
}
