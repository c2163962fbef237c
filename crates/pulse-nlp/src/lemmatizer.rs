//! Rule-based English lemmatizer
//!
//! Irregular forms come from a lookup table. Everything else goes through a
//! small set of suffix rules for plurals, `-ing` and `-ed`. Words the rules
//! would mangle (`news`, `analysis`, `need`) are left alone.

use std::collections::HashMap;
use std::sync::LazyLock;

static IRREGULAR: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("am", "be"),
        ("are", "be"),
        ("is", "be"),
        ("was", "be"),
        ("were", "be"),
        ("been", "be"),
        ("being", "be"),
        ("has", "have"),
        ("had", "have"),
        ("having", "have"),
        ("does", "do"),
        ("did", "do"),
        ("done", "do"),
        ("goes", "go"),
        ("went", "go"),
        ("gone", "go"),
        ("rose", "rise"),
        ("risen", "rise"),
        ("fell", "fall"),
        ("fallen", "fall"),
        ("sold", "sell"),
        ("bought", "buy"),
        ("grew", "grow"),
        ("grown", "grow"),
        ("gave", "give"),
        ("given", "give"),
        ("made", "make"),
        ("said", "say"),
        ("saw", "see"),
        ("seen", "see"),
        ("took", "take"),
        ("taken", "take"),
        ("lost", "lose"),
        ("led", "lead"),
        ("paid", "pay"),
        ("began", "begin"),
        ("begun", "begin"),
        ("came", "come"),
        ("won", "win"),
        ("built", "build"),
        ("brought", "bring"),
        ("thought", "think"),
        ("told", "tell"),
        ("found", "find"),
        ("left", "leave"),
        ("kept", "keep"),
        ("held", "hold"),
        ("spent", "spend"),
        ("sent", "send"),
        ("wrote", "write"),
        ("written", "write"),
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("people", "people"),
        ("data", "data"),
        ("media", "medium"),
    ]
    .into_iter()
    .collect()
});

/// Words that end like inflections but are already base forms
const INVARIANT: &[&str] = &[
    "news", "series", "species", "always", "perhaps", "whereas", "sometimes", "overseas",
    "thus", "bias", "gas", "its", "this", "his", "yes",
];

/// Lemmatizer mapping inflected words to their dictionary form
#[derive(Debug, Clone, Default)]
pub struct Lemmatizer;

impl Lemmatizer {
    pub fn new() -> Self {
        Self
    }

    /// Lemma of a lowercased word
    pub fn lemmatize(&self, word: &str) -> String {
        if let Some(lemma) = IRREGULAR.get(word) {
            return (*lemma).to_string();
        }
        if word.chars().count() <= 3 || INVARIANT.contains(&word) {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix("ies") {
            if stem.chars().count() >= 2 {
                return format!("{stem}y");
            }
        }
        if let Some(stem) = word.strip_suffix("sses") {
            return format!("{stem}ss");
        }
        for suffix in ["ches", "shes", "xes", "zes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        if word.ends_with('s') && !["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
            return word[..word.len() - 1].to_string();
        }

        if let Some(stem) = word.strip_suffix("ing") {
            if let Some(lemma) = verb_stem(stem) {
                return lemma;
            }
        }
        if let Some(stem) = word.strip_suffix("ied") {
            if stem.chars().count() >= 2 {
                return format!("{stem}y");
            }
        }
        if !word.ends_with("eed") {
            if let Some(stem) = word.strip_suffix("ed") {
                if let Some(lemma) = verb_stem(stem) {
                    return lemma;
                }
            }
        }

        word.to_string()
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Number of vowel groups, a rough syllable count
fn vowel_groups(stem: &str) -> usize {
    let mut groups = 0;
    let mut in_vowel = false;
    for c in stem.chars() {
        let vowel = is_vowel(c);
        if vowel && !in_vowel {
            groups += 1;
        }
        in_vowel = vowel;
    }
    groups
}

/// Restore the base form of a verb whose `-ing`/`-ed` suffix was removed
///
/// Returns `None` when the stem is too short to be a verb, so `thing` and
/// `need` stay as they are.
fn verb_stem(stem: &str) -> Option<String> {
    let chars: Vec<char> = stem.chars().collect();
    if chars.len() < 3 || vowel_groups(stem) == 0 {
        return None;
    }

    let last = chars[chars.len() - 1];
    let prev = chars[chars.len() - 2];

    // stopping -> stop, but falling -> fall
    if last == prev && !is_vowel(last) && !matches!(last, 'l' | 's' | 'z') {
        return Some(stem[..stem.len() - last.len_utf8()].to_string());
    }

    // reduced -> reduce, moving -> move, surged -> surge
    if matches!(last, 'c' | 'v')
        || (last == 'z' && prev != 'z')
        || (last == 'g' && matches!(prev, 'r' | 'd'))
    {
        return Some(format!("{stem}e"));
    }

    // trading -> trade, closed -> close; only for single-syllable stems
    let before = chars[chars.len() - 3];
    if !is_vowel(last)
        && !matches!(last, 'w' | 'x' | 'y')
        && is_vowel(prev)
        && !is_vowel(before)
        && vowel_groups(stem) == 1
    {
        return Some(format!("{stem}e"));
    }

    Some(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemma(word: &str) -> String {
        Lemmatizer::new().lemmatize(word)
    }

    #[test]
    fn test_plurals() {
        assert_eq!(lemma("companies"), "company");
        assert_eq!(lemma("shares"), "share");
        assert_eq!(lemma("stocks"), "stock");
        assert_eq!(lemma("losses"), "loss");
        assert_eq!(lemma("taxes"), "tax");
        assert_eq!(lemma("searches"), "search");
    }

    #[test]
    fn test_ing_forms() {
        assert_eq!(lemma("running"), "run");
        assert_eq!(lemma("trading"), "trade");
        assert_eq!(lemma("opening"), "open");
        assert_eq!(lemma("falling"), "fall");
        assert_eq!(lemma("moving"), "move");
        assert_eq!(lemma("thing"), "thing");
    }

    #[test]
    fn test_ed_forms() {
        assert_eq!(lemma("jumped"), "jump");
        assert_eq!(lemma("dropped"), "drop");
        assert_eq!(lemma("closed"), "close");
        assert_eq!(lemma("surged"), "surge");
        assert_eq!(lemma("announced"), "announce");
        assert_eq!(lemma("rallied"), "rally");
        assert_eq!(lemma("reported"), "report");
        assert_eq!(lemma("need"), "need");
    }

    #[test]
    fn test_irregular_and_invariant() {
        assert_eq!(lemma("went"), "go");
        assert_eq!(lemma("rose"), "rise");
        assert_eq!(lemma("fell"), "fall");
        assert_eq!(lemma("news"), "news");
        assert_eq!(lemma("analysis"), "analysis");
        assert_eq!(lemma("status"), "status");
        assert_eq!(lemma("gain"), "gain");
    }
}
