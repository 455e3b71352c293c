use crate::apis::get_json;
use crate::app::ports::{HttpClientPort, RateLimiterPort};
use crate::constants::{NYT_ARTICLE_SEARCH_URL, NYT_MAX_PAGES, NYT_PAGE_SIZE};
use crate::error::CollectorError;
use crate::types::{Collector, DateRange, RawRecord, Source};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    docs: Vec<Article>,
    #[serde(default, alias = "metadata")]
    meta: Option<SearchMeta>,
}

#[derive(Debug, Deserialize)]
struct SearchMeta {
    #[serde(default)]
    hits: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(default)]
    web_url: Option<String>,
    #[serde(default)]
    lead_paragraph: Option<String>,
    #[serde(rename = "abstract", default)]
    summary: Option<String>,
    #[serde(default)]
    headline: Option<Headline>,
    #[serde(default)]
    pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Headline {
    #[serde(default)]
    main: Option<String>,
}

/// New York Times Article Search v2
pub struct NytCollector {
    http: Arc<dyn HttpClientPort>,
    limiter: Arc<dyn RateLimiterPort>,
    api_key: String,
    max_results: usize,
}

impl NytCollector {
    pub fn new(
        http: Arc<dyn HttpClientPort>,
        limiter: Arc<dyn RateLimiterPort>,
        api_key: impl Into<String>,
        max_results: usize,
    ) -> Self {
        Self {
            http,
            limiter,
            api_key: api_key.into(),
            max_results,
        }
    }

    fn page_url(&self, keyword: &str, range: &DateRange, page: usize) -> Result<String, CollectorError> {
        let params = [
            ("q", keyword.to_string()),
            ("begin_date", range.start.format("%Y%m%d").to_string()),
            ("end_date", range.end.format("%Y%m%d").to_string()),
            ("sort", "newest".to_string()),
            ("page", page.to_string()),
            ("api-key", self.api_key.clone()),
        ];
        reqwest::Url::parse_with_params(NYT_ARTICLE_SEARCH_URL, &params)
            .map(|url| url.to_string())
            .map_err(|e| CollectorError::Network(format!("invalid NYT URL: {e}")))
    }
}

#[async_trait::async_trait]
impl Collector for NytCollector {
    fn source(&self) -> Source {
        Source::Nyt
    }

    #[instrument(skip(self), fields(source = "nyt"))]
    async fn fetch(&self, keyword: &str, range: &DateRange) -> Result<Vec<RawRecord>, CollectorError> {
        let pages = self.max_results.div_ceil(NYT_PAGE_SIZE).clamp(1, NYT_MAX_PAGES);
        let mut records = Vec::new();

        for page in 0..pages {
            let url = self.page_url(keyword, range, page)?;
            let body: SearchResponse =
                get_json(Source::Nyt, self.http.as_ref(), self.limiter.as_ref(), &url).await?;
            let returned = body.response.docs.len();
            debug!("NYT page {} returned {} articles", page, returned);

            records.extend(
                body.response
                    .docs
                    .into_iter()
                    .filter_map(article_to_record)
                    .filter(|record| range.contains(&record.timestamp)),
            );

            let hits = body.response.meta.and_then(|m| m.hits);
            let exhausted = returned < NYT_PAGE_SIZE
                || hits.is_some_and(|h| ((page + 1) * NYT_PAGE_SIZE) as u64 >= h);
            if exhausted || records.len() >= self.max_results {
                break;
            }
        }

        records.truncate(self.max_results);
        info!("Successfully fetched {} articles from NYT", records.len());
        Ok(records)
    }
}

fn article_to_record(article: Article) -> Option<RawRecord> {
    let timestamp = parse_pub_date(article.pub_date.as_deref()?)?;
    let identifier = article.id.or(article.web_url)?;
    let non_empty = |s: Option<String>| s.filter(|t| !t.trim().is_empty());
    let text = non_empty(article.lead_paragraph)
        .or_else(|| non_empty(article.summary))
        .or_else(|| non_empty(article.headline.and_then(|h| h.main)))?;
    Some(RawRecord {
        source: Source::Nyt,
        text,
        timestamp,
        identifier,
    })
}

/// NYT uses `2024-03-01T05:00:00+0000`; accept RFC 3339 too
fn parse_pub_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
