use once_cell::sync::Lazy;
use std::collections::HashSet;

/// NLTK English stopwords, minus negations and the n't fragments, and minus
/// the intensifiers the scorer reads (very, too, so, more, most).
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "other", "some", "such", "only", "own",
    "same", "than", "s", "t", "can", "will", "just", "should", "now", "d", "ll", "m", "o",
    "re", "ve", "y", "ma",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPWORDS.iter().copied().collect());

pub fn is_stopword(token: &str) -> bool {
    STOPWORD_SET.contains(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negations_and_intensifiers_survive() {
        for word in ["not", "no", "nor", "very", "too", "so", "more", "most"] {
            assert!(!is_stopword(word), "{word} must reach the scorer");
        }
    }

    #[test]
    fn function_words_are_dropped() {
        for word in ["the", "is", "this", "at", "all", "be"] {
            assert!(is_stopword(word));
        }
    }
}
