//! Text normalization producing the `cleaned_text` column

use crate::lemmatizer::Lemmatizer;
use crate::stopwords::is_stop_word;
use crate::tokenizer::Tokenizer;

/// Turns free text into a normalized token string
pub trait TextNormalizer: Send + Sync {
    /// Normalize text; empty input yields an empty string
    fn normalize(&self, text: &str) -> String;
}

/// English normalizer
///
/// Lowercases, keeps purely alphabetic tokens, drops stop words, lemmatizes
/// and joins the lemmas with single spaces.
#[derive(Debug, Clone, Default)]
pub struct EnglishNormalizer {
    tokenizer: Tokenizer,
    lemmatizer: Lemmatizer,
}

impl EnglishNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lemmas that survive filtering, in order
    pub fn lemmas(&self, text: &str) -> Vec<String> {
        self.tokenizer
            .tokenize(text)
            .into_iter()
            .filter(|token| token.is_alpha && !is_stop_word(&token.lower))
            .map(|token| self.lemmatizer.lemmatize(&token.lower))
            .collect()
    }
}

impl TextNormalizer for EnglishNormalizer {
    fn normalize(&self, text: &str) -> String {
        self.lemmas(text).join(" ")
    }
}
