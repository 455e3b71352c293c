use spectra_sentiment::pipeline::processing::sentiment::{label, Lexicon};
use spectra_sentiment::pipeline::{analyze, normalize, score};
use spectra_sentiment::types::SentimentLabel;

#[test]
fn test_negated_hate_with_praise_is_positive() {
    let canonical = normalize("I don't hate this at all, it's great!!!");
    assert_eq!(canonical.as_str(), "not hate great");

    let polarity = score(&canonical);
    assert!(polarity > 0.0, "polarity was {polarity}");
    assert_eq!(label(polarity), SentimentLabel::Positive);
}

#[test]
fn test_scores_stay_in_bounds() {
    let texts = [
        "",
        "love love love love love love love love love love amazing wonderful",
        "hate hate hate terrible awful horrible disgusting worst",
        "The committee met on Tuesday at 10",
        "not not not good",
        "http://example.com www.example.com",
    ];
    for text in texts {
        let polarity = score(&normalize(text));
        assert!((-1.0..=1.0).contains(&polarity), "{text:?} scored {polarity}");
    }
}

#[test]
fn test_neutral_when_no_lexicon_words() {
    let result = analyze(&normalize("The committee met on Tuesday"));
    assert_eq!(result.polarity, 0.0);
    assert_eq!(result.label, SentimentLabel::Neutral);
    assert!(result.emotion_words.is_empty());
}

#[test]
fn test_normalization_is_idempotent() {
    let samples = [
        "Cafés were running, we're thrilled!! See https://t.co/abc",
        "Children played; 42 people watched the wolves",
        "I can't believe how badly it's going",
    ];
    for sample in samples {
        let once = normalize(sample);
        let twice = normalize(once.as_str());
        assert_eq!(once, twice, "normalizing {sample:?} twice changed it");
    }
}

#[test]
fn test_custom_lexicon_overrides_base() {
    let lexicon = Lexicon::base().with_custom([("ceasefire", 2.5), ("hate", 1.0)]);
    assert_eq!(lexicon.valence("ceasefire"), Some(2.5));
    assert!(lexicon.score(&normalize("ceasefire holds")) > 0.0);
    assert!(lexicon.score(&normalize("hate")) > 0.0);
}

#[test]
fn test_boosters_strengthen_and_negation_flips() {
    let lexicon = Lexicon::base();
    let plain = lexicon.score(&normalize("good"));
    let boosted = lexicon.score(&normalize("very good"));
    let negated = lexicon.score(&normalize("not good"));
    assert!(boosted > plain);
    assert!(negated < 0.0);
}
