use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use spectra_sentiment::error::{CollectorError, SpectraError};
use spectra_sentiment::infra::response_cache::InMemoryResponseCache;
use spectra_sentiment::pipeline::processing::sentiment::{score_record, shared_lexicon};
use spectra_sentiment::pipeline::{aggregate, SentimentPipeline, SentimentQuery};
use spectra_sentiment::types::{Collector, DateRange, Granularity, RawRecord, Source};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn record(source: Source, day: u32, id: &str, text: &str) -> RawRecord {
    RawRecord {
        source,
        text: text.to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 1, day, 9, 30, 0).unwrap(),
        identifier: id.to_string(),
    }
}

fn january() -> DateRange {
    DateRange::parse("2024-01-01", "2024-01-31").unwrap()
}

/// Returns a fixed batch and counts how often it was asked
struct StubCollector {
    source: Source,
    records: Vec<RawRecord>,
    calls: Arc<AtomicUsize>,
}

impl StubCollector {
    fn new(source: Source, records: Vec<RawRecord>) -> Self {
        Self {
            source,
            records,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Collector for StubCollector {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch(&self, _keyword: &str, _range: &DateRange) -> Result<Vec<RawRecord>, CollectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }
}

struct FailingCollector(Source, CollectorError);

#[async_trait]
impl Collector for FailingCollector {
    fn source(&self) -> Source {
        self.0
    }

    async fn fetch(&self, _keyword: &str, _range: &DateRange) -> Result<Vec<RawRecord>, CollectorError> {
        Err(self.1.clone())
    }
}

struct SlowCollector(Source);

#[async_trait]
impl Collector for SlowCollector {
    fn source(&self) -> Source {
        self.0
    }

    async fn fetch(&self, _keyword: &str, _range: &DateRange) -> Result<Vec<RawRecord>, CollectorError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

fn nyt_records() -> Vec<RawRecord> {
    vec![
        record(Source::Nyt, 3, "nyt-1", "A wonderful recovery brings hope"),
        record(Source::Nyt, 3, "nyt-2", "Terrible losses and grief"),
        record(Source::Nyt, 4, "nyt-3", "The committee met on Tuesday"),
    ]
}

fn reddit_records() -> Vec<RawRecord> {
    vec![
        record(Source::Reddit, 3, "r-1", "I love this, it's great"),
        record(Source::Reddit, 5, "r-2", "I don't like it at all"),
    ]
}

#[tokio::test]
async fn test_failed_source_leaves_the_rest_intact() -> Result<()> {
    let mut collectors: BTreeMap<Source, Arc<dyn Collector>> = BTreeMap::new();
    collectors.insert(
        Source::Flickr,
        Arc::new(FailingCollector(Source::Flickr, CollectorError::Auth("Invalid API Key".into()))),
    );
    collectors.insert(Source::Nyt, Arc::new(StubCollector::new(Source::Nyt, nyt_records())));
    collectors.insert(Source::Reddit, Arc::new(StubCollector::new(Source::Reddit, reddit_records())));

    let pipeline = SentimentPipeline::new(collectors);
    let sources: BTreeSet<Source> = Source::ALL.into_iter().collect();
    let outcome = pipeline.run(&sources, "gaza", january()).await?;

    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].source, Source::Flickr);
    assert_eq!(outcome.warnings[0].error.kind(), "auth");
    assert_eq!(outcome.records_scored, 5);

    // Same buckets as aggregating the surviving sources directly
    let lexicon = shared_lexicon();
    let scored: Vec<_> = nyt_records()
        .into_iter()
        .chain(reddit_records())
        .map(|r| score_record(r, &lexicon))
        .collect();
    let expected = aggregate(&scored, Granularity::Day, 5);
    assert_eq!(outcome.buckets, expected);
    assert!(outcome.buckets.iter().all(|b| b.source != Source::Flickr));
    Ok(())
}

#[tokio::test]
async fn test_invalid_query_never_reaches_collectors() -> Result<()> {
    let stub = StubCollector::new(Source::Nyt, nyt_records());
    let calls = stub.calls.clone();
    let mut collectors: BTreeMap<Source, Arc<dyn Collector>> = BTreeMap::new();
    collectors.insert(Source::Nyt, Arc::new(stub));
    let pipeline = SentimentPipeline::new(collectors);
    let sources = BTreeSet::from([Source::Nyt]);

    let result = pipeline.run(&sources, "  ", january()).await;
    assert!(matches!(result, Err(SpectraError::Input(_))));

    let backwards = DateRange {
        start: january().end,
        end: january().start,
    };
    let result = pipeline.run(&sources, "gaza", backwards).await;
    assert!(matches!(result, Err(SpectraError::Input(_))));

    let mut query = SentimentQuery::new(sources, "gaza", january());
    query.top_n = Some(0);
    assert!(pipeline.run_query(&query).await.is_err());

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_slow_source_times_out_as_warning() -> Result<()> {
    let mut collectors: BTreeMap<Source, Arc<dyn Collector>> = BTreeMap::new();
    collectors.insert(Source::Flickr, Arc::new(SlowCollector(Source::Flickr)));
    collectors.insert(Source::Nyt, Arc::new(StubCollector::new(Source::Nyt, nyt_records())));
    let pipeline = SentimentPipeline::new(collectors).with_timeout(Duration::from_secs(5));

    let sources = BTreeSet::from([Source::Flickr, Source::Nyt]);
    let outcome = pipeline.run(&sources, "gaza", january()).await?;

    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].error, CollectorError::Timeout(5));
    assert_eq!(outcome.per_source_counts.get(&Source::Nyt), Some(&3));
    Ok(())
}

#[tokio::test]
async fn test_cache_serves_repeat_queries() -> Result<()> {
    let stub = StubCollector::new(Source::Reddit, reddit_records());
    let calls = stub.calls.clone();
    let mut collectors: BTreeMap<Source, Arc<dyn Collector>> = BTreeMap::new();
    collectors.insert(Source::Reddit, Arc::new(stub));
    let pipeline = SentimentPipeline::new(collectors)
        .with_cache(Arc::new(InMemoryResponseCache::new(Duration::from_secs(60))));
    let sources = BTreeSet::from([Source::Reddit]);

    let first = pipeline.run(&sources, "Gaza", january()).await?;
    let second = pipeline.run(&sources, " gaza ", january()).await?;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.buckets, second.buckets);
    Ok(())
}

#[tokio::test]
async fn test_week_granularity_merges_days() -> Result<()> {
    let mut collectors: BTreeMap<Source, Arc<dyn Collector>> = BTreeMap::new();
    collectors.insert(Source::Reddit, Arc::new(StubCollector::new(Source::Reddit, reddit_records())));
    let pipeline = SentimentPipeline::new(collectors);

    let mut query = SentimentQuery::new(BTreeSet::from([Source::Reddit]), "gaza", january());
    query.granularity = Some(Granularity::Week);
    query.top_n = Some(1);
    let outcome = pipeline.run_query(&query).await?;

    // 2024-01-03 and 2024-01-05 both fall in the week starting Monday 2024-01-01
    assert_eq!(outcome.buckets.len(), 1);
    let bucket = &outcome.buckets[0];
    assert_eq!(bucket.time_bucket.to_string(), "2024-01-01");
    assert_eq!(bucket.count, 2);
    assert_eq!(bucket.positive_examples.len(), 1);
    assert_eq!(bucket.positive_examples[0].record.identifier, "r-1");
    Ok(())
}
