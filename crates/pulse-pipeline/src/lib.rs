//! Processing stages for pulse-rs
//!
//! Everything after collection: cleaning raw tables, scoring news sentiment,
//! merging prices with scored news by day, fitting `Close ~ sentiment` and
//! evaluating the fit. Each stage implements [`pulse_core::Stage`] and talks
//! only to a [`pulse_core::TableStore`]; [`Pipeline`] runs them in order.

pub mod evaluate;
pub mod merge;
pub mod pipeline;
pub mod preprocess;
pub mod regression;
pub mod sentiment;
pub mod train;

pub use evaluate::{ComparisonPoint, Evaluation, Evaluator, evaluate_model, try_evaluate_model};
pub use merge::{MergedDataset, load_data, try_load_data};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use preprocess::{Preprocessor, clean_stock_data, preprocess_news};
pub use regression::{LinearModel, RegressionMetrics};
pub use sentiment::{SentimentScorer, analyze_sentiment};
pub use train::{TrainOptions, TrainedModel, Trainer, train_model, try_train_model};
