use crate::types::{AggregateBucket, Granularity, ScoredRecord, SentimentLabel, Source};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Group scored records by (source, time bucket) and summarize each group.
///
/// Output is sorted by source then bucket start. Empty groups never appear.
/// Example lists hold at most `top_n` records each; ties on polarity go to the
/// earlier timestamp, then the smaller identifier.
pub fn aggregate(
    records: &[ScoredRecord],
    granularity: Granularity,
    top_n: usize,
) -> Vec<AggregateBucket> {
    let mut groups: BTreeMap<(Source, NaiveDate), Vec<&ScoredRecord>> = BTreeMap::new();
    for record in records {
        let bucket = granularity.bucket_start(record.record.timestamp);
        groups
            .entry((record.record.source, bucket))
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .map(|((source, time_bucket), mut members)| {
            let count = members.len();
            // Sum in a fixed order so repeated calls are bit-identical
            members.sort_by(|a, b| tie_break(a, b));
            let total: f64 = members.iter().map(|r| r.polarity).sum();
            let mean_polarity = total / count as f64;

            let mut positive_count = 0;
            let mut neutral_count = 0;
            let mut negative_count = 0;
            for member in &members {
                match member.label {
                    SentimentLabel::Positive => positive_count += 1,
                    SentimentLabel::Neutral => neutral_count += 1,
                    SentimentLabel::Negative => negative_count += 1,
                }
            }

            let mut descending = members.clone();
            descending.sort_by(|a, b| {
                b.polarity
                    .total_cmp(&a.polarity)
                    .then_with(|| tie_break(a, b))
            });
            let positive_examples = descending
                .into_iter()
                .take(top_n)
                .cloned()
                .collect();

            let mut ascending = members;
            ascending.sort_by(|a, b| {
                a.polarity
                    .total_cmp(&b.polarity)
                    .then_with(|| tie_break(a, b))
            });
            let negative_examples = ascending.into_iter().take(top_n).cloned().collect();

            AggregateBucket {
                source,
                time_bucket,
                count,
                mean_polarity,
                positive_count,
                neutral_count,
                negative_count,
                positive_examples,
                negative_examples,
            }
        })
        .collect()
}

fn tie_break(a: &ScoredRecord, b: &ScoredRecord) -> Ordering {
    a.record
        .timestamp
        .cmp(&b.record.timestamp)
        .then_with(|| a.record.identifier.cmp(&b.record.identifier))
}
