use crate::error::CollectorError;
use crate::types::{DateRange, RawRecord, Source};
use async_trait::async_trait;

// Collector-side ports
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpGetResult, CollectorError>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl HttpGetResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait RateLimiterPort: Send + Sync {
    async fn acquire(&self);
}

// Orchestrator-side ports
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: Source,
    pub keyword: String,
    pub range: DateRange,
}

impl CacheKey {
    pub fn new(source: Source, keyword: &str, range: DateRange) -> Self {
        Self {
            source,
            keyword: keyword.trim().to_lowercase(),
            range,
        }
    }
}

/// Time-bounded store of collector responses keyed by query
#[async_trait]
pub trait ResponseCachePort: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<Vec<RawRecord>>;
    async fn put(&self, key: CacheKey, records: Vec<RawRecord>);
}
