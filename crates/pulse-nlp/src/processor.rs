//! Text processing service shared by the preprocessing and scoring stages

use crate::analyzer::{LexiconAnalyzer, SentimentAnalyzer};
use crate::normalizer::{EnglishNormalizer, TextNormalizer};
use std::fmt;
use std::sync::Arc;

/// Normalizer plus analyzer, built once and handed to the stages that need it
#[derive(Clone)]
pub struct TextProcessor {
    normalizer: Arc<dyn TextNormalizer>,
    analyzer: Arc<dyn SentimentAnalyzer>,
}

impl TextProcessor {
    pub fn new(normalizer: Arc<dyn TextNormalizer>, analyzer: Arc<dyn SentimentAnalyzer>) -> Self {
        Self {
            normalizer,
            analyzer,
        }
    }

    /// English normalizer with the built-in lexicon
    pub fn english() -> Self {
        Self::new(
            Arc::new(EnglishNormalizer::new()),
            Arc::new(LexiconAnalyzer::new()),
        )
    }

    /// Replace the analyzer, keeping the normalizer
    pub fn with_analyzer(mut self, analyzer: Arc<dyn SentimentAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Normalized text of an optional description; `None` yields `""`
    pub fn clean(&self, text: Option<&str>) -> String {
        text.map(|t| self.normalizer.normalize(t)).unwrap_or_default()
    }

    /// Polarity of an optional cleaned text; `None` and `""` score 0.0
    pub fn score(&self, text: Option<&str>) -> f64 {
        match text {
            Some(t) if !t.trim().is_empty() => self.analyzer.polarity(t),
            _ => 0.0,
        }
    }
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Debug for TextProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextProcessor").finish_non_exhaustive()
    }
}
