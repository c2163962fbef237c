//! Word tokenizer
//!
//! Splits text into word tokens the way an English NLP pipeline would for our
//! purposes: punctuation is split off, possessives and contractions are
//! separated from their stem, and each token remembers whether it is purely
//! alphabetic.

use regex::Regex;
use std::sync::LazyLock;

/// Runs of letters/digits, optionally followed by an apostrophe suffix
static WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}]+)?").expect("word pattern is valid")
});

/// A single token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Text as it appeared
    pub text: String,
    /// Lowercased text
    pub lower: String,
    /// Only alphabetic characters
    pub is_alpha: bool,
}

impl Token {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            lower: text.to_lowercase(),
            is_alpha: !text.is_empty() && text.chars().all(char::is_alphabetic),
        }
    }
}

/// Tokenizer for English prose
#[derive(Debug, Clone, Default)]
pub struct Tokenizer;

impl Tokenizer {
    /// Create a new tokenizer
    pub fn new() -> Self {
        Self
    }

    /// Tokenize text
    ///
    /// `"Apple's"` becomes `Apple` + `'s` and `"don't"` becomes `do` + `n't`;
    /// the suffix pieces are not alphabetic and are dropped by alpha filters.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();

        for m in WORD_REGEX.find_iter(text) {
            let word = m.as_str();
            match word.find(['\'', '’']) {
                Some(pos) => {
                    let (stem, suffix) = word.split_at(pos);
                    let suffix_body = &suffix[suffix.chars().next().map_or(1, char::len_utf8)..];
                    let lower_body = suffix_body.to_lowercase();

                    if lower_body == "t" && stem.to_lowercase().ends_with('n') && stem.len() > 1 {
                        // "don't" -> "do" + "n't"
                        let split = stem.len() - 1;
                        tokens.push(Token::new(&stem[..split]));
                        tokens.push(Token::new(&format!("n'{suffix_body}")));
                    } else {
                        tokens.push(Token::new(stem));
                        tokens.push(Token::new(suffix));
                    }
                }
                None => tokens.push(Token::new(word)),
            }
        }

        tokens
    }

    /// Tokenize and return lowercased strings
    pub fn tokenize_to_strings(&self, text: &str) -> Vec<String> {
        self.tokenize(text).into_iter().map(|t| t.lower).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokenization() {
        let tokens = Tokenizer::new().tokenize("Shares rose 3%, analysts said.");
        let words: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["Shares", "rose", "3", "analysts", "said"]);
        assert!(tokens[0].is_alpha);
        assert!(!tokens[2].is_alpha);
    }

    #[test]
    fn test_possessive_is_split() {
        let tokens = Tokenizer::new().tokenize("Apple's iPhone");
        let words: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["Apple", "'s", "iPhone"]);
        assert!(!tokens[1].is_alpha);
    }

    #[test]
    fn test_contraction_is_split() {
        let words = Tokenizer::new().tokenize_to_strings("Investors don't panic");
        assert_eq!(words, vec!["investors", "do", "n't", "panic"]);
    }

    #[test]
    fn test_mixed_alphanumeric_is_not_alpha() {
        let tokens = Tokenizer::new().tokenize("Q3 earnings");
        assert!(!tokens[0].is_alpha);
        assert!(tokens[1].is_alpha);
    }
}
