//! Command-line interface for pulse-rs

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use pulse_collector::Collector;
use pulse_core::config::NEWS_API_KEY_ENV;
use pulse_core::{FsTableStore, PipelineConfig, Stage, StageReport};
use pulse_nlp::{Lexicon, LexiconAnalyzer, TextProcessor};
use pulse_pipeline::{Evaluator, Pipeline, Preprocessor, SentimentScorer, TrainOptions, Trainer};
use pulse_utils::LogFormat;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pulse")]
#[command(about = "News sentiment to closing price pipeline", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data root, overriding the configuration
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    log_format: LogFormat,

    /// Extra `word<TAB>valence` lexicon merged over the built-in one
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct CollectArgs {
    /// First day of the collection window (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day of the collection window (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end: Option<NaiveDate>,

    /// NewsAPI key
    #[arg(long, env = NEWS_API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download raw prices and news
    Collect(CollectArgs),
    /// Clean raw tables into the processed area
    Preprocess,
    /// Score processed news
    Sentiment,
    /// Merge prices with scored news and fit the model
    Train,
    /// Fit, then compare predictions with actual closes
    Evaluate,
    /// Run every stage in order
    Run(CollectArgs),
}

impl Command {
    fn collect_args(&self) -> Option<&CollectArgs> {
        match self {
            Self::Collect(args) | Self::Run(args) => Some(args),
            _ => None,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }
    if let Some(args) = cli.command.collect_args() {
        if let Some(start) = args.start {
            config.start_date = start;
        }
        if args.end.is_some() {
            config.end_date = args.end;
        }
        if args.api_key.is_some() {
            config.news_api_key.clone_from(&args.api_key);
        }
    }

    let config = config.with_env_api_key();
    config.validate()?;
    Ok(config)
}

fn text_processor(lexicon: Option<&PathBuf>) -> anyhow::Result<TextProcessor> {
    let processor = TextProcessor::english();
    let Some(path) = lexicon else {
        return Ok(processor);
    };
    let lexicon = Lexicon::from_file(path)
        .with_context(|| format!("loading lexicon from {}", path.display()))?;
    info!("Loaded {} lexicon entries", lexicon.len());
    Ok(processor.with_analyzer(Arc::new(LexiconAnalyzer::with_lexicon(lexicon))))
}

fn log_report(report: &StageReport) {
    for failure in &report.failures {
        tracing::warn!("{}: {failure}", report.stage);
    }
    info!("{}", report.summary());
}

fn print_output(report: &StageReport) {
    if let Some(output) = &report.output {
        println!("{output}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    pulse_utils::init_tracing_with(cli.log_format, pulse_utils::logging::DEFAULT_FILTER);

    let config = load_config(&cli)?;
    let store = FsTableStore::new(&config.data_dir);
    info!("Using data root {}", store.root().display());

    let processor = text_processor(cli.lexicon.as_ref())?;
    let options = TrainOptions::from(&config);

    let stage: Arc<dyn Stage> = match cli.command {
        Command::Collect(_) => Arc::new(Collector::from_config(&config)?),
        Command::Preprocess => Arc::new(Preprocessor::new(processor, config.companies.clone())),
        Command::Sentiment => Arc::new(SentimentScorer::new(processor)),
        Command::Train => Arc::new(Trainer::new(options)),
        Command::Evaluate => Arc::new(Evaluator::new(options)),
        Command::Run(_) => {
            let pipeline = Pipeline::from_config_with(&config, processor)?;
            let reports = pipeline.run(&store).await?;
            reports.iter().for_each(print_output);
            info!("Pipeline finished");
            return Ok(());
        },
    };

    info!("Running stage {}", stage.name());
    let report = stage.run(&store).await?;
    log_report(&report);
    print_output(&report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_collect_overrides() {
        let cli = Cli::try_parse_from([
            "pulse",
            "--data-dir",
            "/tmp/pulse",
            "collect",
            "--start",
            "2024-08-11",
            "--end",
            "2024-08-20",
            "--api-key",
            "k",
        ])
        .unwrap();

        let config = load_config(&cli).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/pulse"));
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2024, 8, 11).unwrap());
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2024, 8, 20));
        assert_eq!(config.news_api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_cli_rejects_inverted_window() {
        let cli = Cli::try_parse_from([
            "pulse", "run", "--start", "2024-08-20", "--end", "2024-08-11",
        ])
        .unwrap();
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn test_cli_log_format() {
        let cli = Cli::try_parse_from(["pulse", "--log-format", "json", "train"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Command::Train));
        assert!(Cli::try_parse_from(["pulse", "--log-format", "xml", "train"]).is_err());
    }
}
