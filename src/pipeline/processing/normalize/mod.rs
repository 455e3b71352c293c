//! Text normalization into canonical, scorer-ready form.

mod contractions;
mod lemmatizer;
mod numbers;
mod stopwords;

pub use contractions::expand_contractions;
pub use lemmatizer::lemmatize;
pub use numbers::number_to_words;
pub use stopwords::is_stopword;

use crate::types::CanonicalText;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:https?://|www\.)\S+").expect("url pattern is valid"));

/// Reduce free text to canonical form.
///
/// Steps, in order:
/// 1. strip URLs
/// 2. NFKD-decompose and drop non-ASCII
/// 3. expand contractions
/// 4. lowercase
/// 5. drop punctuation, spell out short digit runs
/// 6. drop stopwords
/// 7. lemmatize, drop lemmas that are stopwords
///
/// Total and pure; applying it to its own output is a no-op.
pub fn normalize(text: &str) -> CanonicalText {
    let without_urls = URL_RE.replace_all(text, "");
    let ascii: String = without_urls.nfkd().filter(char::is_ascii).collect();
    let expanded = expand_contractions(&ascii);
    let lowered = expanded.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    let tokens: Vec<String> = stripped
        .split_whitespace()
        .flat_map(|token| match number_to_words(token) {
            Some(words) => words.split(' ').map(str::to_string).collect::<Vec<_>>(),
            None => vec![token.to_string()],
        })
        .filter(|token| !is_stopword(token))
        .map(|token| lemmatize(&token))
        .filter(|lemma| !is_stopword(lemma))
        .collect();

    CanonicalText::new(tokens.join(" "))
}
