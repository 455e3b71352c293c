use crate::apis::flickr::FlickrCollector;
use crate::apis::nyt::NytCollector;
use crate::apis::reddit::RedditCollector;
use crate::app::ports::{HttpClientPort, RateLimiterPort};
use crate::config::{AppConfig, Credentials};
use crate::types::{Collector, Source};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Build a collector for every source whose credentials are present.
/// Sources left out are reported as not configured when queried.
pub fn create_collectors(
    config: &AppConfig,
    credentials: &Credentials,
    http: Arc<dyn HttpClientPort>,
    limiter: Arc<dyn RateLimiterPort>,
) -> BTreeMap<Source, Arc<dyn Collector>> {
    let max_results = config.collection.max_results;
    let mut collectors: BTreeMap<Source, Arc<dyn Collector>> = BTreeMap::new();

    match &credentials.flickr_api_key {
        Some(key) => {
            collectors.insert(
                Source::Flickr,
                Arc::new(FlickrCollector::new(http.clone(), limiter.clone(), key.clone(), max_results)),
            );
        }
        None => warn!("FLICKR_API_KEY not set; Flickr will be unavailable"),
    }

    match &credentials.nyt_api_key {
        Some(key) => {
            collectors.insert(
                Source::Nyt,
                Arc::new(NytCollector::new(http, limiter, key.clone(), max_results)),
            );
        }
        None => warn!("NYT_API_KEY not set; NYT will be unavailable"),
    }

    let data_file = credentials
        .reddit_data_file
        .clone()
        .unwrap_or_else(|| config.reddit.data_file.clone());
    collectors.insert(
        Source::Reddit,
        Arc::new(RedditCollector::new(data_file, max_results)),
    );

    collectors
}
