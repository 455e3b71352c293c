//! Valence lexicon and the scoring rules applied over canonical tokens.

use crate::pipeline::processing::normalize::normalize;
use crate::types::{CanonicalText, SentimentLabel};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Multiplier applied to a valence preceded by a negation word
pub const NEGATION_SCALAR: f64 = -0.74;

/// Normalization constant in `s / sqrt(s² + ALPHA)`
pub const ALPHA: f64 = 15.0;

/// Base valences on a -4..4 scale. Keys are already canonical.
pub const BASE_VALENCES: &[(&str, f64)] = &[
    // positive
    ("good", 1.9),
    ("great", 3.1),
    ("love", 3.2),
    ("like", 2.0),
    ("happy", 2.7),
    ("excellent", 2.7),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("wonderful", 2.7),
    ("beautiful", 2.9),
    ("gorgeous", 3.0),
    ("stunning", 2.3),
    ("brilliant", 2.8),
    ("best", 3.2),
    ("better", 1.9),
    ("nice", 1.8),
    ("fantastic", 2.6),
    ("perfect", 2.7),
    ("lovely", 2.8),
    ("glad", 2.0),
    ("joy", 2.8),
    ("hope", 1.9),
    ("hopeful", 2.3),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("grateful", 2.0),
    ("thankful", 2.7),
    ("blessed", 2.9),
    ("safe", 1.9),
    ("free", 2.3),
    ("freedom", 3.2),
    ("liberty", 2.4),
    ("win", 2.8),
    ("victory", 2.5),
    ("success", 2.7),
    ("successful", 2.8),
    ("brave", 2.4),
    ("courage", 2.2),
    ("kind", 2.4),
    ("care", 2.2),
    ("help", 1.7),
    ("helpful", 1.8),
    ("support", 1.7),
    ("peace", 2.5),
    ("peaceful", 2.2),
    ("agree", 1.5),
    ("celebrate", 2.7),
    ("smile", 1.5),
    ("laugh", 2.2),
    ("fun", 2.3),
    ("enjoy", 2.2),
    ("interesting", 1.7),
    ("strong", 2.3),
    ("proud", 2.1),
    ("pretty", 2.2),
    ("cool", 1.3),
    ("wow", 2.8),
    ("yes", 1.7),
    ("ok", 1.2),
    ("fine", 0.8),
    ("calm", 1.3),
    ("heal", 1.4),
    ("save", 2.2),
    ("rescue", 1.5),
    ("relief", 2.1),
    ("friend", 2.2),
    ("friendly", 2.2),
    ("honest", 2.3),
    ("fair", 1.3),
    ("justice", 2.4),
    ("solidarity", 1.2),
    ("unity", 1.9),
    ("inspire", 2.7),
    ("inspiring", 2.6),
    ("impressive", 2.3),
    ("incredible", 2.0),
    ("favorite", 2.0),
    ("pleased", 1.9),
    ("satisfied", 1.8),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("trust", 2.3),
    ("praise", 2.6),
    ("comfort", 1.5),
    ("secure", 1.4),
    ("positive", 2.6),
    ("optimistic", 1.3),
    ("clean", 1.7),
    // negative
    ("bad", -2.5),
    ("terrible", -2.1),
    ("awful", -2.0),
    ("horrible", -2.5),
    ("hate", -2.7),
    ("sad", -2.1),
    ("angry", -2.3),
    ("anger", -2.7),
    ("worst", -3.1),
    ("worse", -2.1),
    ("evil", -3.4),
    ("kill", -3.7),
    ("killer", -3.3),
    ("death", -2.9),
    ("die", -2.9),
    ("dead", -3.3),
    ("war", -2.9),
    ("attack", -2.1),
    ("violence", -3.1),
    ("violent", -2.9),
    ("murder", -3.7),
    ("massacre", -3.6),
    ("genocide", -3.4),
    ("terror", -3.0),
    ("terrorist", -3.7),
    ("terrorism", -3.6),
    ("fear", -2.2),
    ("afraid", -2.2),
    ("scared", -1.9),
    ("pain", -2.3),
    ("hurt", -2.4),
    ("suffer", -2.5),
    ("suffering", -2.1),
    ("tragic", -3.4),
    ("tragedy", -3.4),
    ("disaster", -3.1),
    ("crisis", -3.1),
    ("destroy", -2.8),
    ("destruction", -2.7),
    ("damage", -2.2),
    ("threat", -2.4),
    ("threaten", -2.0),
    ("danger", -2.4),
    ("dangerous", -2.1),
    ("cruel", -2.8),
    ("cruelty", -2.9),
    ("brutal", -3.1),
    ("horror", -2.7),
    ("horrific", -3.4),
    ("disgusting", -2.4),
    ("shame", -2.1),
    ("shameful", -2.2),
    ("wrong", -2.1),
    ("fail", -2.3),
    ("failure", -2.3),
    ("problem", -1.7),
    ("poor", -2.1),
    ("poverty", -2.3),
    ("sick", -2.3),
    ("cry", -2.1),
    ("grief", -2.2),
    ("mourn", -1.8),
    ("loss", -1.3),
    ("lose", -1.6),
    ("hostile", -2.2),
    ("enemy", -2.5),
    ("chaos", -2.7),
    ("panic", -2.3),
    ("worry", -1.9),
    ("worried", -1.2),
    ("upset", -1.6),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("boring", -1.3),
    ("ugly", -2.3),
    ("stupid", -2.4),
    ("crazy", -1.4),
    ("annoying", -1.6),
    ("lie", -1.6),
    ("corrupt", -2.6),
    ("injustice", -2.7),
    ("oppression", -1.6),
    ("bomb", -2.2),
    ("starve", -1.9),
    ("starvation", -2.6),
    ("famine", -2.5),
    ("abuse", -3.2),
    ("violate", -2.2),
    ("victim", -2.5),
];

/// Intensifiers and dampeners that scale the next sentiment-bearing token
pub const BOOSTERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("extremely", 1.8),
    ("really", 1.4),
    ("so", 1.3),
    ("too", 1.3),
    ("more", 1.2),
    ("most", 1.4),
    ("absolutely", 1.6),
    ("incredibly", 1.7),
    ("totally", 1.4),
    ("completely", 1.5),
    ("deeply", 1.5),
    ("highly", 1.4),
    ("truly", 1.3),
    ("especially", 1.3),
    ("slightly", 0.7),
    ("barely", 0.6),
    ("hardly", 0.6),
    ("somewhat", 0.8),
    ("little", 0.7),
    ("less", 0.7),
];

pub const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "nowhere", "neither", "nor", "cannot",
    "without", "dont", "doesnt", "didnt", "cant", "couldnt", "wont", "wouldnt", "shouldnt",
    "isnt", "arent", "wasnt", "werent", "havent", "hasnt", "hadnt", "aint", "neednt",
    "mightnt", "mustnt", "shant",
];

/// Breakdown of one scored text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentScore {
    pub polarity: f64,
    pub label: SentimentLabel,
    pub emotion_words: Vec<String>,
}

/// Immutable valence lexicon with booster and negation rules
#[derive(Debug, Clone)]
pub struct Lexicon {
    valences: HashMap<String, f64>,
    boosters: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::base()
    }
}

impl Lexicon {
    pub fn base() -> Self {
        Self {
            valences: BASE_VALENCES
                .iter()
                .map(|(word, valence)| (word.to_string(), *valence))
                .collect(),
            boosters: BOOSTERS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        }
    }

    /// Layer custom entries over the current valences. Keys are normalized the
    /// same way record text is, so `"killed"` lands on `kill`.
    pub fn with_custom<I, K>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        for (raw, valence) in entries {
            let raw = raw.as_ref();
            if !valence.is_finite() {
                warn!("Skipping custom lexicon entry '{}': non-finite valence", raw);
                continue;
            }
            let canonical = normalize(raw);
            let mut tokens = canonical.tokens();
            match (tokens.next(), tokens.next()) {
                (Some(word), None) => {
                    self.valences.insert(word.to_string(), valence);
                }
                _ => {
                    debug!("Skipping custom lexicon entry '{}': not a single canonical word", raw);
                }
            }
        }
        self
    }

    pub fn valence(&self, word: &str) -> Option<f64> {
        self.valences.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }

    /// Compound polarity in [-1, 1]
    pub fn score(&self, text: &CanonicalText) -> f64 {
        let tokens: Vec<&str> = text.tokens().collect();
        let (sum, _) = self.valence_sum(&tokens);
        normalize_score(sum)
    }

    pub fn analyze(&self, text: &CanonicalText) -> SentimentScore {
        let tokens: Vec<&str> = text.tokens().collect();
        let (sum, emotion_words) = self.valence_sum(&tokens);
        let polarity = normalize_score(sum);
        SentimentScore {
            polarity,
            label: SentimentLabel::from_polarity(polarity),
            emotion_words,
        }
    }

    fn valence_sum(&self, tokens: &[&str]) -> (f64, Vec<String>) {
        let mut sum = 0.0;
        let mut emotion_words: Vec<String> = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(base) = self.valence(token) else {
                continue;
            };
            let mut valence = base;

            // Walk back over any run of boosters, then look for a negation before it
            let mut j = i;
            while j > 0 {
                match self.boosters.get(tokens[j - 1]) {
                    Some(factor) => {
                        valence *= factor;
                        j -= 1;
                    }
                    None => break,
                }
            }
            if j > 0 && self.negations.contains(tokens[j - 1]) {
                valence *= NEGATION_SCALAR;
            }

            sum += valence;
            if base != 0.0 && !emotion_words.iter().any(|w| w == token) {
                emotion_words.push(token.to_string());
            }
        }

        (sum, emotion_words)
    }
}

/// Map an unbounded valence sum into [-1, 1]
pub fn normalize_score(sum: f64) -> f64 {
    if sum == 0.0 {
        return 0.0;
    }
    // Overflowed sums saturate instead of turning into NaN
    if !sum.is_finite() {
        return if sum.is_nan() { 0.0 } else { sum.signum() };
    }
    // hypot keeps the denominator finite for very large sums
    (sum / sum.hypot(ALPHA.sqrt())).clamp(-1.0, 1.0)
}

static SHARED: OnceCell<Arc<Lexicon>> = OnceCell::new();

/// Install the process-wide lexicon. Returns false if one was already in place.
pub fn install_lexicon(lexicon: Lexicon) -> bool {
    SHARED.set(Arc::new(lexicon)).is_ok()
}

/// The process-wide lexicon, defaulting to the base lexicon
pub fn shared_lexicon() -> Arc<Lexicon> {
    SHARED.get_or_init(|| Arc::new(Lexicon::base())).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::{is_stopword, lemmatize};

    fn canon(s: &str) -> CanonicalText {
        CanonicalText::new(s.to_string())
    }

    #[test]
    fn negation_flips_and_damps() {
        let lexicon = Lexicon::base();
        let plain = lexicon.score(&canon("hate"));
        let negated = lexicon.score(&canon("not hate"));
        assert!(plain < 0.0);
        assert!(negated > 0.0);
        assert!(negated.abs() < plain.abs());
    }

    #[test]
    fn negation_reaches_through_boosters() {
        let lexicon = Lexicon::base();
        assert!(lexicon.score(&canon("not very good")) < 0.0);
        assert!(lexicon.score(&canon("very good")) > lexicon.score(&canon("good")));
        assert!(lexicon.score(&canon("slightly good")) < lexicon.score(&canon("good")));
    }

    #[test]
    fn known_sum_is_normalized() {
        let lexicon = Lexicon::base();
        // -2.7 * -0.74 + 3.1
        let sum: f64 = 1.998 + 3.1;
        let expected = sum / (sum * sum + 15.0).sqrt();
        let score = lexicon.score(&canon("not hate great"));
        assert!((score - expected).abs() < 1e-12);
        assert!(score > 0.79 && score < 0.80);
    }

    #[test]
    fn empty_and_unknown_text_is_neutral() {
        let lexicon = Lexicon::base();
        assert_eq!(lexicon.score(&CanonicalText::default()), 0.0);
        let result = lexicon.analyze(&canon("gaza street photo"));
        assert_eq!(result.polarity, 0.0);
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert!(result.emotion_words.is_empty());
    }

    #[test]
    fn scores_stay_bounded() {
        let lexicon = Lexicon::base();
        let long = std::iter::repeat("extremely awesome")
            .take(500)
            .collect::<Vec<_>>()
            .join(" ");
        let score = lexicon.score(&canon(&long));
        assert!(score <= 1.0 && score > 0.99);
        assert!(normalize_score(f64::MAX) <= 1.0);
        assert!(normalize_score(f64::MIN) >= -1.0);
    }

    #[test]
    fn overflowing_sums_saturate() {
        assert_eq!(normalize_score(f64::INFINITY), 1.0);
        assert_eq!(normalize_score(f64::NEG_INFINITY), -1.0);
        assert_eq!(normalize_score(f64::NAN), 0.0);

        let lexicon = Lexicon::base().with_custom([("truce", 1e308), ("peace", 1e308)]);
        let result = lexicon.analyze(&canon("truce peace"));
        assert_eq!(result.polarity, 1.0);
        assert_eq!(result.label, SentimentLabel::Positive);
    }

    #[test]
    fn emotion_words_are_listed_once() {
        let result = Lexicon::base().analyze(&canon("love peace love gaza"));
        assert_eq!(result.emotion_words, vec!["love", "peace"]);
    }

    #[test]
    fn custom_entries_override_and_are_canonicalized() {
        let lexicon = Lexicon::base().with_custom([
            ("peace", 0.8),
            ("Killed", -0.8),
            ("ceasefire", 0.6),
            ("two words", 1.0),
            ("broken", f64::NAN),
        ]);
        assert_eq!(lexicon.valence("peace"), Some(0.8));
        assert_eq!(lexicon.valence("kill"), Some(-0.8));
        assert_eq!(lexicon.valence("ceasefire"), Some(0.6));
        assert_eq!(lexicon.valence("two"), None);
        assert_eq!(lexicon.valence("break"), None);
    }

    #[test]
    fn base_keys_are_canonical() {
        for (word, _) in BASE_VALENCES {
            assert!(word.bytes().all(|b| b.is_ascii_lowercase()), "{word}");
            assert!(!is_stopword(word), "{word} is a stopword");
            assert_eq!(lemmatize(word), *word, "{word} is not a lemma");
        }
        for (word, _) in BOOSTERS {
            assert!(!is_stopword(word), "{word} is a stopword");
        }
        for word in NEGATIONS {
            assert!(!is_stopword(word), "{word} is a stopword");
        }
    }
}
