use crate::app::ports::{CacheKey, ResponseCachePort};
use crate::config::AppConfig;
use crate::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOP_N, MAX_KEYWORD_LEN};
use crate::error::{CollectorError, Result, SpectraError};
use crate::infra::response_cache::InMemoryResponseCache;
use crate::metrics::{AnalysisMetrics, SourcesMetrics};
use crate::pipeline::processing::aggregate::aggregate;
use crate::pipeline::processing::sentiment::{score_record, shared_lexicon, Lexicon};
use crate::types::{AggregateBucket, Collector, DateRange, Granularity, RawRecord, ScoredRecord, Source};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// A source that contributed nothing to a run, and why
#[derive(Debug, Clone, PartialEq)]
pub struct SourceWarning {
    pub source: Source,
    pub error: CollectorError,
}

impl Serialize for SourceWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SourceWarning", 3)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("kind", self.error.kind())?;
        state.serialize_field("message", &self.error.to_string())?;
        state.end()
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub buckets: Vec<AggregateBucket>,
    pub warnings: Vec<SourceWarning>,
    pub records_scored: usize,
    pub per_source_counts: BTreeMap<Source, usize>,
}

impl RunOutcome {
    /// True when at least one requested source was skipped
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// One query against the pipeline. Granularity and top-N fall back to the
/// pipeline's defaults when unset.
#[derive(Debug, Clone)]
pub struct SentimentQuery {
    pub sources: BTreeSet<Source>,
    pub keyword: String,
    pub range: DateRange,
    pub granularity: Option<Granularity>,
    pub top_n: Option<usize>,
}

impl SentimentQuery {
    pub fn new(sources: BTreeSet<Source>, keyword: impl Into<String>, range: DateRange) -> Self {
        Self {
            sources,
            keyword: keyword.into(),
            range,
            granularity: None,
            top_n: None,
        }
    }

    /// Reject bad input before any collector is touched
    pub fn validate(&self) -> Result<()> {
        let keyword = self.keyword.trim();
        if keyword.is_empty() {
            return Err(SpectraError::Input("keyword must not be empty".into()));
        }
        if keyword.chars().count() > MAX_KEYWORD_LEN {
            return Err(SpectraError::Input(format!(
                "keyword longer than {MAX_KEYWORD_LEN} characters"
            )));
        }
        if keyword.chars().any(char::is_control) {
            return Err(SpectraError::Input("keyword contains control characters".into()));
        }
        if self.sources.is_empty() {
            return Err(SpectraError::Input("at least one source is required".into()));
        }
        if self.top_n == Some(0) {
            return Err(SpectraError::Input("top_n must be at least 1".into()));
        }
        self.range.validate()
    }
}

/// Collect, score and aggregate sentiment across sources
pub struct SentimentPipeline {
    collectors: BTreeMap<Source, Arc<dyn Collector>>,
    cache: Option<Arc<dyn ResponseCachePort>>,
    fetch_timeout: Duration,
    granularity: Granularity,
    top_n: usize,
    lexicon: Arc<Lexicon>,
}

impl SentimentPipeline {
    pub fn new(collectors: BTreeMap<Source, Arc<dyn Collector>>) -> Self {
        Self {
            collectors,
            cache: None,
            fetch_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            granularity: Granularity::default(),
            top_n: DEFAULT_TOP_N,
            lexicon: shared_lexicon(),
        }
    }

    /// Pipeline wired from configuration; the cache is enabled when its TTL is positive
    pub fn from_config(config: &AppConfig, collectors: BTreeMap<Source, Arc<dyn Collector>>) -> Self {
        let mut pipeline = Self::new(collectors)
            .with_timeout(Duration::from_secs(config.collection.request_timeout_secs))
            .with_granularity(config.analysis.granularity)
            .with_top_n(config.analysis.top_n);
        if config.collection.cache_ttl_secs > 0 {
            let ttl = Duration::from_secs(config.collection.cache_ttl_secs);
            pipeline = pipeline.with_cache(Arc::new(InMemoryResponseCache::new(ttl)));
        }
        pipeline
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCachePort>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    pub fn with_lexicon(mut self, lexicon: Arc<Lexicon>) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn configured_sources(&self) -> Vec<Source> {
        self.collectors.keys().copied().collect()
    }

    pub async fn run(&self, sources: &BTreeSet<Source>, keyword: &str, range: DateRange) -> Result<RunOutcome> {
        self.run_query(&SentimentQuery::new(sources.clone(), keyword, range))
            .await
    }

    #[instrument(skip(self), fields(keyword = %query.keyword, range = %query.range))]
    pub async fn run_query(&self, query: &SentimentQuery) -> Result<RunOutcome> {
        if let Err(e) = query.validate() {
            AnalysisMetrics::record_rejected_query();
            return Err(e);
        }
        let started = Instant::now();
        let keyword = query.keyword.trim().to_string();
        let granularity = query.granularity.unwrap_or(self.granularity);
        let top_n = query.top_n.unwrap_or(self.top_n);

        info!(
            "🚀 Starting sentiment run for '{}' over {} ({} sources)",
            keyword,
            query.range,
            query.sources.len()
        );

        // Fan out: one task per configured source
        let mut pending = Vec::new();
        let mut warnings = Vec::new();
        for &source in &query.sources {
            match self.collectors.get(&source) {
                Some(collector) => {
                    let task = tokio::spawn(fetch_source(
                        collector.clone(),
                        self.cache.clone(),
                        CacheKey::new(source, &keyword, query.range),
                        self.fetch_timeout,
                    ));
                    pending.push((source, task));
                }
                None => {
                    let error = CollectorError::NotConfigured(format!("no collector for {source}"));
                    warn!("⚠️ {} unavailable: {}", source, error);
                    SourcesMetrics::record_unavailable(source, error.kind());
                    warnings.push(SourceWarning { source, error });
                }
            }
        }

        // Join in source order so the concatenation is deterministic
        let mut scored: Vec<ScoredRecord> = Vec::new();
        let mut per_source_counts = BTreeMap::new();
        for (source, task) in pending {
            let fetched = match task.await {
                Ok(result) => result,
                Err(join_error) => Err(CollectorError::Network(format!(
                    "collector task aborted: {join_error}"
                ))),
            };
            match fetched {
                Ok(records) => {
                    info!("✅ {} returned {} records", source, records.len());
                    per_source_counts.insert(source, records.len());
                    scored.extend(records.into_iter().map(|record| {
                        let item = score_record(record, &self.lexicon);
                        AnalysisMetrics::record_scored(source, item.label);
                        item
                    }));
                }
                Err(error) => {
                    warn!("⚠️ {} unavailable: {}", source, error);
                    SourcesMetrics::record_unavailable(source, error.kind());
                    warnings.push(SourceWarning { source, error });
                }
            }
        }
        warnings.sort_by_key(|w| w.source);

        let buckets = aggregate(&scored, granularity, top_n);
        let elapsed = started.elapsed().as_secs_f64();
        AnalysisMetrics::record_run(buckets.len(), warnings.len(), elapsed);

        info!(
            "🎉 Sentiment run complete: {} records scored, {} buckets, {} sources skipped in {:.2}s",
            scored.len(),
            buckets.len(),
            warnings.len(),
            elapsed
        );

        Ok(RunOutcome {
            buckets,
            warnings,
            records_scored: scored.len(),
            per_source_counts,
        })
    }
}

async fn fetch_source(
    collector: Arc<dyn Collector>,
    cache: Option<Arc<dyn ResponseCachePort>>,
    key: CacheKey,
    timeout: Duration,
) -> std::result::Result<Vec<RawRecord>, CollectorError> {
    let source = key.source;
    if let Some(cache) = &cache {
        if let Some(records) = cache.get(&key).await {
            debug!("📦 {} served from cache", source);
            SourcesMetrics::record_cache_hit(source);
            return Ok(records);
        }
    }

    let started = Instant::now();
    let records = tokio::time::timeout(timeout, collector.fetch(&key.keyword, &key.range))
        .await
        .map_err(|_| CollectorError::Timeout(timeout.as_secs()))??;
    SourcesMetrics::record_fetch(source, records.len(), started.elapsed().as_secs_f64());

    if let Some(cache) = &cache {
        cache.put(key, records.clone()).await;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> DateRange {
        DateRange::parse("2024-01-01", "2024-01-31").unwrap()
    }

    fn query(keyword: &str) -> SentimentQuery {
        SentimentQuery::new(BTreeSet::from([Source::Nyt]), keyword, range())
    }

    #[test]
    fn keyword_validation() {
        assert!(query("gaza").validate().is_ok());
        assert!(query("   ").validate().is_err());
        assert!(query("bad\u{0007}word").validate().is_err());
        assert!(query(&"x".repeat(MAX_KEYWORD_LEN + 1)).validate().is_err());
        assert!(query(&"x".repeat(MAX_KEYWORD_LEN)).validate().is_ok());
    }

    #[test]
    fn empty_source_set_is_rejected() {
        let q = SentimentQuery::new(BTreeSet::new(), "gaza", range());
        assert!(matches!(q.validate(), Err(SpectraError::Input(_))));
    }

    #[test]
    fn warning_serializes_kind_and_message() {
        let warning = SourceWarning {
            source: Source::Flickr,
            error: CollectorError::Auth("Invalid API Key".into()),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["source"], "flickr");
        assert_eq!(json["kind"], "auth");
        assert!(json["message"].as_str().unwrap().contains("Invalid API Key"));
    }

    #[tokio::test]
    async fn unconfigured_source_becomes_warning() {
        let pipeline = SentimentPipeline::new(BTreeMap::new());
        let outcome = pipeline
            .run(&BTreeSet::from([Source::Reddit]), "gaza", range())
            .await
            .unwrap();
        assert!(outcome.buckets.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].error.kind(), "not_configured");
        assert!(outcome.is_partial());
    }
}
