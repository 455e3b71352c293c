use crate::apis::get_json;
use crate::apis::html::clean_html;
use crate::app::ports::{HttpClientPort, RateLimiterPort};
use crate::constants::{FLICKR_MIN_COMMENT_LEN, FLICKR_REST_URL};
use crate::error::CollectorError;
use crate::types::{Collector, DateRange, RawRecord, Source};
use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Flickr caps photos.search pages at 500
const FLICKR_MAX_PER_PAGE: usize = 500;

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("link pattern is valid"));

/// Comments on photos tagged with the keyword
pub struct FlickrCollector {
    http: Arc<dyn HttpClientPort>,
    limiter: Arc<dyn RateLimiterPort>,
    api_key: String,
    max_results: usize,
}

impl FlickrCollector {
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

    fn method_url(&self, method: &str, params: &[(&str, String)]) -> Result<String, CollectorError> {
        let mut query: Vec<(&str, String)> = vec![
            ("method", method.to_string()),
            ("api_key", self.api_key.clone()),
            ("format", "json".to_string()),
            ("nojsoncallback", "1".to_string()),
        ];
        query.extend(params.iter().cloned());
        let url = reqwest::Url::parse_with_params(FLICKR_REST_URL, &query)
            .map_err(|e| CollectorError::Network(format!("invalid Flickr URL: {e}")))?;
        Ok(url.to_string())
    }

    async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<Value, CollectorError> {
        let url = self.method_url(method, params)?;
        let body: Value = get_json(Source::Flickr, self.http.as_ref(), self.limiter.as_ref(), &url).await?;
        check_stat(&body)?;
        Ok(body)
    }

    async fn search_photos(&self, keyword: &str, range: &DateRange) -> Result<Vec<String>, CollectorError> {
        let per_page = self.max_results.clamp(1, FLICKR_MAX_PER_PAGE);
        let params = [
            ("tags", keyword.to_string()),
            ("tag_mode", "all".to_string()),
            ("min_upload_date", range.start_datetime().timestamp().to_string()),
            ("max_upload_date", range.end_exclusive().timestamp().to_string()),
            ("per_page", per_page.to_string()),
            ("sort", "date-posted-desc".to_string()),
            ("extras", "date_upload".to_string()),
        ];
        let body = self.call("flickr.photos.search", &params).await?;
        parse_photo_ids(&body)
    }

    async fn photo_comments(&self, photo_id: &str, range: &DateRange) -> Result<Vec<RawRecord>, CollectorError> {
        let body = self
            .call("flickr.photos.comments.getList", &[("photo_id", photo_id.to_string())])
            .await?;
        parse_comments(&body, range)
    }
}

#[async_trait::async_trait]
impl Collector for FlickrCollector {
    fn source(&self) -> Source {
        Source::Flickr
    }

    #[instrument(skip(self), fields(source = "flickr"))]
    async fn fetch(&self, keyword: &str, range: &DateRange) -> Result<Vec<RawRecord>, CollectorError> {
        let photo_ids = self.search_photos(keyword, range).await?;
        debug!("Flickr search returned {} photos", photo_ids.len());

        let mut records = Vec::new();
        for photo_id in &photo_ids {
            match self.photo_comments(photo_id, range).await {
                Ok(comments) => records.extend(comments),
                // Credential and quota problems affect every photo, so give up
                Err(e @ (CollectorError::Auth(_) | CollectorError::RateLimited(_))) => return Err(e),
                Err(e) => warn!("Skipping comments for photo {}: {}", photo_id, e),
            }
        }

        info!(
            "Successfully fetched {} comments from {} Flickr photos",
            records.len(),
            photo_ids.len()
        );
        Ok(records)
    }
}

/// Flickr reports API failures in-band with HTTP 200
fn check_stat(body: &Value) -> Result<(), CollectorError> {
    match body["stat"].as_str() {
        Some("ok") => Ok(()),
        Some("fail") => {
            let code = body["code"].as_i64().unwrap_or_default();
            let message = body["message"].as_str().unwrap_or("unknown error");
            let detail = format!("Flickr error {code}: {message}");
            Err(match code {
                // invalid key, invalid signature, insufficient permissions
                96..=100 => CollectorError::Auth(detail),
                105 => CollectorError::RateLimited(detail),
                _ => CollectorError::Network(detail),
            })
        }
        _ => Err(CollectorError::Malformed("Flickr response has no stat field".into())),
    }
}

fn parse_photo_ids(body: &Value) -> Result<Vec<String>, CollectorError> {
    let photos = body["photos"]["photo"]
        .as_array()
        .ok_or_else(|| CollectorError::Malformed("photos.photo not found".into()))?;
    Ok(photos
        .iter()
        .filter_map(|photo| match &photo["id"] {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
        .collect())
}

fn parse_comments(body: &Value, range: &DateRange) -> Result<Vec<RawRecord>, CollectorError> {
    let comments = &body["comments"];
    if !comments.is_object() {
        return Err(CollectorError::Malformed("comments not found".into()));
    }
    // Photos without comments omit the array entirely
    let Some(list) = comments["comment"].as_array() else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    for comment in list {
        let Some(id) = comment["id"].as_str() else {
            debug!("Skipping Flickr comment without id");
            continue;
        };
        let created = match &comment["datecreate"] {
            Value::String(s) => s.parse::<i64>().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        };
        let Some(timestamp) = created.and_then(|secs| Utc.timestamp_opt(secs, 0).single()) else {
            debug!("Skipping Flickr comment {} with bad datecreate", id);
            continue;
        };
        if !range.contains(&timestamp) {
            continue;
        }
        let Some(text) = clean_comment_text(comment["_content"].as_str().unwrap_or_default()) else {
            continue;
        };
        records.push(RawRecord {
            source: Source::Flickr,
            text,
            timestamp,
            identifier: id.to_string(),
        });
    }
    Ok(records)
}

/// Plain comment text, or None when too short to carry any signal
pub fn clean_comment_text(raw: &str) -> Option<String> {
    let text = clean_html(raw);
    let text = LINK_RE.replace_all(&text, "");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (text.chars().count() > FLICKR_MIN_COMMENT_LEN).then_some(text)
}
