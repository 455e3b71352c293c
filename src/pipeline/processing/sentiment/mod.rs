pub mod lexicon;

pub use lexicon::{install_lexicon, shared_lexicon, Lexicon, SentimentScore};

use crate::pipeline::processing::normalize::normalize;
use crate::types::{CanonicalText, RawRecord, ScoredRecord, SentimentLabel};

/// Polarity of canonical text against the process-wide lexicon
pub fn score(text: &CanonicalText) -> f64 {
    shared_lexicon().score(text)
}

pub fn analyze(text: &CanonicalText) -> SentimentScore {
    shared_lexicon().analyze(text)
}

pub fn label(polarity: f64) -> SentimentLabel {
    SentimentLabel::from_polarity(polarity)
}

/// Normalize and score one raw record
pub fn score_record(record: RawRecord, lexicon: &Lexicon) -> ScoredRecord {
    let canonical = normalize(&record.text);
    let SentimentScore {
        polarity,
        label,
        emotion_words,
    } = lexicon.analyze(&canonical);
    ScoredRecord {
        record,
        polarity,
        label,
        emotion_words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Source;
    use chrono::Utc;

    #[test]
    fn scored_record_keeps_raw_fields() {
        let raw = RawRecord {
            source: Source::Reddit,
            text: "What a wonderful, peaceful day!".into(),
            timestamp: Utc::now(),
            identifier: "t1_abc".into(),
        };
        let scored = score_record(raw.clone(), &Lexicon::base());
        assert_eq!(scored.record, raw);
        assert_eq!(scored.label, SentimentLabel::Positive);
        assert_eq!(scored.label, label(scored.polarity));
        assert!(scored.emotion_words.contains(&"wonderful".to_string()));
    }
}
