//! Sentiment lexicon
//!
//! Valences use the usual lexicon scale of roughly -4 (most negative) to +4
//! (most positive). The built-in word list leans towards market and business
//! news; more words can be loaded from a tab-separated file whose first two
//! fields are `word` and `valence` (extra fields are ignored).

use pulse_core::{PipelineError, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Intensity added by a booster word
pub const BOOSTER_INCREMENT: f64 = 0.293;

/// Intensity removed by a dampener word
pub const BOOSTER_DECREMENT: f64 = -0.293;

const BUILTIN_VALENCES: &[(&str, f64)] = &[
    // general
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("amazing", 2.8),
    ("best", 3.2),
    ("better", 1.9),
    ("positive", 2.6),
    ("happy", 2.7),
    ("love", 3.2),
    ("like", 1.5),
    ("win", 2.8),
    ("success", 2.7),
    ("successful", 2.8),
    ("strong", 2.3),
    ("benefit", 2.0),
    ("opportunity", 1.8),
    ("optimism", 2.5),
    ("optimistic", 2.3),
    ("confidence", 2.3),
    ("confident", 2.2),
    ("innovative", 1.9),
    ("innovation", 1.8),
    ("bad", -2.5),
    ("worse", -2.1),
    ("worst", -3.1),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("negative", -2.7),
    ("sad", -2.1),
    ("hate", -2.7),
    ("fail", -2.5),
    ("failure", -2.3),
    ("weak", -1.9),
    ("problem", -1.7),
    ("concern", -1.3),
    ("worry", -1.9),
    ("fear", -2.2),
    ("risk", -1.1),
    ("threat", -2.4),
    ("crisis", -3.1),
    ("pessimistic", -1.9),
    ("uncertainty", -1.4),
    ("uncertain", -1.2),
    // markets
    ("gain", 2.4),
    ("profit", 1.9),
    ("profitable", 1.9),
    ("growth", 1.6),
    ("grow", 1.3),
    ("rally", 1.8),
    ("surge", 1.7),
    ("soar", 2.0),
    ("jump", 1.2),
    ("boost", 1.7),
    ("rise", 1.0),
    ("beat", 1.2),
    ("outperform", 1.9),
    ("upgrade", 1.8),
    ("record", 0.9),
    ("bullish", 2.0),
    ("breakthrough", 2.3),
    ("recover", 1.6),
    ("recovery", 1.6),
    ("dividend", 0.8),
    ("loss", -1.3),
    ("lose", -1.7),
    ("decline", -1.4),
    ("drop", -1.1),
    ("fall", -1.1),
    ("plunge", -2.2),
    ("tumble", -1.9),
    ("slump", -1.9),
    ("crash", -2.6),
    ("sink", -1.4),
    ("slide", -1.0),
    ("miss", -1.2),
    ("underperform", -1.7),
    ("downgrade", -1.8),
    ("bearish", -2.0),
    ("recession", -2.5),
    ("layoff", -2.1),
    ("lawsuit", -1.9),
    ("sue", -1.6),
    ("fraud", -3.2),
    ("scandal", -2.8),
    ("bankruptcy", -3.0),
    ("bankrupt", -3.0),
    ("investigation", -1.1),
    ("recall", -1.4),
    ("delay", -1.3),
    ("volatile", -1.1),
    ("volatility", -1.0),
    ("selloff", -2.0),
];

const BUILTIN_BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", BOOSTER_INCREMENT),
    ("completely", BOOSTER_INCREMENT),
    ("considerably", BOOSTER_INCREMENT),
    ("deeply", BOOSTER_INCREMENT),
    ("enormously", BOOSTER_INCREMENT),
    ("especially", BOOSTER_INCREMENT),
    ("extremely", BOOSTER_INCREMENT),
    ("highly", BOOSTER_INCREMENT),
    ("hugely", BOOSTER_INCREMENT),
    ("incredibly", BOOSTER_INCREMENT),
    ("massively", BOOSTER_INCREMENT),
    ("most", BOOSTER_INCREMENT),
    ("really", BOOSTER_INCREMENT),
    ("remarkably", BOOSTER_INCREMENT),
    ("sharply", BOOSTER_INCREMENT),
    ("significantly", BOOSTER_INCREMENT),
    ("so", BOOSTER_INCREMENT),
    ("strongly", BOOSTER_INCREMENT),
    ("substantially", BOOSTER_INCREMENT),
    ("totally", BOOSTER_INCREMENT),
    ("very", BOOSTER_INCREMENT),
    ("almost", BOOSTER_DECREMENT),
    ("barely", BOOSTER_DECREMENT),
    ("hardly", BOOSTER_DECREMENT),
    ("marginally", BOOSTER_DECREMENT),
    ("partly", BOOSTER_DECREMENT),
    ("slightly", BOOSTER_DECREMENT),
    ("somewhat", BOOSTER_DECREMENT),
];

const BUILTIN_NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "nowhere", "without",
    "cannot", "dont", "doesnt", "didnt", "isnt", "wasnt", "arent", "werent", "wont", "cant",
    "shouldnt", "wouldnt", "couldnt", "n't", "rarely", "seldom", "despite",
];

/// Word valences plus the modifier words the analyzer reacts to
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    valences: HashMap<String, f64>,
    boosters: HashMap<String, f64>,
    negations: HashSet<String>,
}

impl Lexicon {
    /// Lexicon with no words at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in lexicon
    pub fn builtin() -> Self {
        Self {
            valences: BUILTIN_VALENCES
                .iter()
                .map(|(w, v)| ((*w).to_string(), *v))
                .collect(),
            boosters: BUILTIN_BOOSTERS
                .iter()
                .map(|(w, v)| ((*w).to_string(), *v))
                .collect(),
            negations: BUILTIN_NEGATIONS.iter().map(|w| (*w).to_string()).collect(),
        }
    }

    /// Built-in lexicon extended with the words of a lexicon file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut lexicon = Self::builtin();
        lexicon.load_file(path)?;
        Ok(lexicon)
    }

    /// Add the words of a lexicon file, returning how many were read
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::MissingFile(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let added = self.load_str(&content)?;
        tracing::debug!("Loaded {added} lexicon entries from {}", path.display());
        Ok(added)
    }

    /// Add the words of lexicon text in file format
    pub fn load_str(&mut self, content: &str) -> Result<usize> {
        let mut added = 0;
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim_end();
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split('\t');
            let word = fields.next().unwrap_or_default().trim();
            let valence = fields
                .next()
                .and_then(|v| v.trim().parse::<f64>().ok())
                .ok_or_else(|| {
                    PipelineError::ConfigError(format!(
                        "Invalid lexicon entry on line {}: '{line}'",
                        line_no + 1
                    ))
                })?;

            self.add_word(word, valence);
            added += 1;
        }
        Ok(added)
    }

    /// Add or replace a word's valence
    pub fn add_word(&mut self, word: &str, valence: f64) {
        self.valences.insert(word.to_lowercase(), valence);
    }

    /// Valence of a lowercased word
    pub fn valence(&self, word: &str) -> Option<f64> {
        self.valences.get(word).copied()
    }

    /// Booster or dampener scalar of a lowercased word
    pub fn booster(&self, word: &str) -> Option<f64> {
        self.boosters.get(word).copied()
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word)
    }

    /// Number of scored words
    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_lookup() {
        let lexicon = Lexicon::builtin();
        assert_eq!(lexicon.valence("good"), Some(1.9));
        assert!(lexicon.valence("crash").unwrap() < 0.0);
        assert_eq!(lexicon.valence("apple"), None);
        assert_eq!(lexicon.booster("very"), Some(BOOSTER_INCREMENT));
        assert_eq!(lexicon.booster("slightly"), Some(BOOSTER_DECREMENT));
        assert!(lexicon.is_negation("not"));
        assert!(!lexicon.is_negation("good"));
    }

    #[test]
    fn test_load_str_ignores_extra_fields() {
        let mut lexicon = Lexicon::empty();
        let added = lexicon
            .load_str("# comment\n\nmoonshot\t2.5\t0.5\t[2, 3]\nDud\t-1.5\n")
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(lexicon.valence("moonshot"), Some(2.5));
        assert_eq!(lexicon.valence("dud"), Some(-1.5));
    }

    #[test]
    fn test_load_str_rejects_bad_valence() {
        let mut lexicon = Lexicon::empty();
        let err = lexicon.load_str("word\tnot-a-number\n").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(_)));
    }

    #[test]
    fn test_from_file_extends_builtin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "antitrust\t-1.8").unwrap();

        let lexicon = Lexicon::from_file(file.path()).unwrap();
        assert_eq!(lexicon.valence("antitrust"), Some(-1.8));
        assert_eq!(lexicon.valence("good"), Some(1.9));
    }

    #[test]
    fn test_from_missing_file() {
        let err = Lexicon::from_file("/definitely/not/here.tsv").unwrap_err();
        assert!(matches!(err, PipelineError::MissingFile(_)));
    }
}
