//! Lexicon-based compound sentiment
//!
//! Each word found in the lexicon contributes its valence, adjusted by
//! booster words and negations up to three words before it. A contrastive
//! "but" shifts weight towards the clause that follows it and exclamation
//! marks add emphasis. The sum is squashed into `[-1, 1]` with
//! `s / sqrt(s² + α)` and rounded to four decimals.

use crate::lexicon::Lexicon;

/// Normalization constant of the compound score
pub const ALPHA: f64 = 15.0;

/// Scale applied to a valence preceded by a negation
pub const NEGATION_SCALAR: f64 = -0.74;

/// Extra intensity of an ALL-CAPS word in mixed-case text
pub const CAPS_INCREMENT: f64 = 0.733;

/// Emphasis added per exclamation mark, up to four of them
const EXCLAMATION_INCREMENT: f64 = 0.292;

/// How far back boosters and negations reach
const WINDOW: usize = 3;

/// Maps text to a polarity score
pub trait SentimentAnalyzer: Send + Sync {
    /// Compound score in `[-1, 1]`; text without sentiment scores 0.0
    fn polarity(&self, text: &str) -> f64;
}

/// Compound-score analyzer over a [`Lexicon`]
#[derive(Debug, Clone)]
pub struct LexiconAnalyzer {
    lexicon: Lexicon,
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconAnalyzer {
    /// Analyzer over the built-in lexicon
    pub fn new() -> Self {
        Self::with_lexicon(Lexicon::builtin())
    }

    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Per-word valences after modifiers, one entry per word
    fn valences(&self, words: &[&str], mixed_case: bool) -> Vec<f64> {
        let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        let mut valences = Vec::with_capacity(words.len());

        for (i, word) in lower.iter().enumerate() {
            let base = match self.lexicon.valence(word) {
                Some(v) if self.lexicon.booster(word).is_none() => v,
                _ => {
                    valences.push(0.0);
                    continue;
                }
            };

            let mut valence = base;
            if mixed_case && is_shouting(words[i]) {
                valence += if valence < 0.0 {
                    -CAPS_INCREMENT
                } else {
                    CAPS_INCREMENT
                };
            }

            for distance in 1..=WINDOW.min(i) {
                let prev = lower[i - distance].as_str();
                if self.lexicon.valence(prev).is_none() {
                    if let Some(scalar) = self.lexicon.booster(prev) {
                        let scalar = if valence < 0.0 { -scalar } else { scalar };
                        valence += match distance {
                            1 => scalar,
                            2 => scalar * 0.95,
                            _ => scalar * 0.9,
                        };
                    }
                }
                if self.lexicon.is_negation(prev) {
                    valence *= NEGATION_SCALAR;
                }
            }

            valences.push(valence);
        }

        valences
    }
}

impl SentimentAnalyzer for LexiconAnalyzer {
    fn polarity(&self, text: &str) -> f64 {
        let words: Vec<&str> = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return 0.0;
        }

        let mixed_case = words.iter().any(|w| is_shouting(w))
            && words.iter().any(|w| !is_shouting(w));
        let mut valences = self.valences(&words, mixed_case);

        if let Some(but) = words.iter().position(|w| w.eq_ignore_ascii_case("but")) {
            for (i, valence) in valences.iter_mut().enumerate() {
                if i < but {
                    *valence *= 0.5;
                } else if i > but {
                    *valence *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum != 0.0 {
            let bangs = text.matches('!').count().min(4);
            let emphasis = bangs as f64 * EXCLAMATION_INCREMENT;
            sum += if sum > 0.0 { emphasis } else { -emphasis };
        }

        round4(compound(sum))
    }
}

/// Squash a raw valence sum into `[-1, 1]`
pub fn compound(sum: f64) -> f64 {
    if sum == 0.0 {
        return 0.0;
    }
    (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round4(value: f64) -> f64 {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    // avoid "-0" in output tables
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn is_shouting(word: &str) -> bool {
    word.chars().any(char::is_alphabetic) && !word.chars().any(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> f64 {
        LexiconAnalyzer::new().polarity(text)
    }

    #[test]
    fn test_empty_and_neutral_text() {
        assert_eq!(score(""), 0.0);
        assert_eq!(score("   "), 0.0);
        assert_eq!(score("apple announce iphone"), 0.0);
    }

    #[test]
    fn test_single_word_compound() {
        // 1.9 / sqrt(1.9² + 15)
        assert_eq!(score("good"), 0.4404);
        assert!(score("crash") < 0.0);
    }

    #[test]
    fn test_negation_flips_polarity() {
        assert!(score("not good") < 0.0);
        assert_eq!(score("not good"), -0.3412);
    }

    #[test]
    fn test_booster_increases_intensity() {
        assert!(score("very good") > score("good"));
        assert!(score("slightly good") < score("good"));
        assert!(score("very bad") < score("bad"));
    }

    #[test]
    fn test_but_favours_second_clause() {
        assert!(score("good but terrible") < 0.0);
    }

    #[test]
    fn test_exclamation_emphasis() {
        assert!(score("good!") > score("good"));
    }

    #[test]
    fn test_bounded_and_deterministic() {
        let text = "great great great best amazing excellent win gain surge rally";
        let first = score(text);
        assert!((-1.0..=1.0).contains(&first));
        assert_eq!(first, score(text));
    }

    #[test]
    fn test_custom_lexicon() {
        let mut lexicon = Lexicon::empty();
        lexicon.add_word("moonshot", 2.0);
        let analyzer = LexiconAnalyzer::with_lexicon(lexicon);
        assert!(analyzer.polarity("moonshot") > 0.0);
        assert_eq!(analyzer.polarity("good"), 0.0);
    }
}
