//! Text normalization and sentiment scoring for pulse-rs
//!
//! [`TextProcessor`] bundles the two halves used by the pipeline: a
//! [`TextNormalizer`] producing `cleaned_text` and a [`SentimentAnalyzer`]
//! producing the compound `sentiment` score.

pub mod analyzer;
pub mod lemmatizer;
pub mod lexicon;
pub mod normalizer;
pub mod processor;
pub mod stopwords;
pub mod tokenizer;

pub use analyzer::{LexiconAnalyzer, SentimentAnalyzer};
pub use lemmatizer::Lemmatizer;
pub use lexicon::Lexicon;
pub use normalizer::{EnglishNormalizer, TextNormalizer};
pub use processor::TextProcessor;
pub use tokenizer::{Token, Tokenizer};
