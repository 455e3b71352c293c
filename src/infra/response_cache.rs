use crate::app::ports::{CacheKey, ResponseCachePort};
use crate::types::RawRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory response cache with a fixed time-to-live per entry
#[derive(Clone)]
pub struct InMemoryResponseCache {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<CacheKey, (Instant, Vec<RawRecord>)>>>,
}

impl InMemoryResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ResponseCachePort for InMemoryResponseCache {
    async fn get(&self, key: &CacheKey) -> Option<Vec<RawRecord>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((stored_at, records)) if stored_at.elapsed() < self.ttl => {
                debug!("cache hit for {} '{}'", key.source, key.keyword);
                Some(records.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: CacheKey, records: Vec<RawRecord>) {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        entries.insert(key, (Instant::now(), records));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DateRange, Source};

    fn key(keyword: &str) -> CacheKey {
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        CacheKey::new(Source::Nyt, keyword, range)
    }

    #[tokio::test]
    async fn hit_within_ttl() {
        let cache = InMemoryResponseCache::new(Duration::from_secs(60));
        cache.put(key("Gaza"), Vec::new()).await;
        assert_eq!(cache.get(&key(" gaza ")).await, Some(Vec::new()));
        assert!(cache.get(&key("israel")).await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_dropped() {
        let cache = InMemoryResponseCache::new(Duration::from_millis(20));
        cache.put(key("gaza"), Vec::new()).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get(&key("gaza")).await.is_none());
        assert!(cache.is_empty().await);
    }
}
