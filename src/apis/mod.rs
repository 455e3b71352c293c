pub mod factory;
pub mod flickr;
pub mod html;
pub mod nyt;
pub mod reddit;

use crate::app::ports::{HttpClientPort, HttpGetResult, RateLimiterPort};
use crate::error::CollectorError;
use crate::metrics::sources::SourcesMetrics;
use crate::types::Source;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::debug;

/// Map a non-2xx status to the collector error taxonomy
pub(crate) fn check_status(source: Source, result: &HttpGetResult) -> Result<(), CollectorError> {
    if result.is_success() {
        return Ok(());
    }
    let detail = format!("{} returned HTTP {}", source, result.status);
    Err(match result.status {
        401 | 403 => CollectorError::Auth(detail),
        429 => CollectorError::RateLimited(detail),
        _ => CollectorError::Network(detail),
    })
}

/// Rate-limited GET that decodes a JSON body
pub(crate) async fn get_json<T: DeserializeOwned>(
    source: Source,
    http: &dyn HttpClientPort,
    limiter: &dyn RateLimiterPort,
    url: &str,
) -> Result<T, CollectorError> {
    limiter.acquire().await;
    let started = Instant::now();
    let result = http.get(url).await;
    let elapsed = started.elapsed().as_secs_f64();

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            SourcesMetrics::record_request_error(source, e.kind());
            return Err(e);
        }
    };
    if let Err(e) = check_status(source, &response) {
        SourcesMetrics::record_request_error(source, e.kind());
        return Err(e);
    }
    SourcesMetrics::record_request_success(source, elapsed, response.bytes.len());
    debug!(
        "{} responded with {} bytes ({})",
        source,
        response.bytes.len(),
        response.content_type
    );

    serde_json::from_slice(&response.bytes).map_err(|e| {
        SourcesMetrics::record_request_error(source, "malformed");
        CollectorError::Malformed(format!("{source} response: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> HttpGetResult {
        HttpGetResult {
            status,
            bytes: Vec::new(),
            content_type: "application/json".into(),
        }
    }

    #[test]
    fn status_mapping() {
        assert!(check_status(Source::Nyt, &response(200)).is_ok());
        assert!(matches!(
            check_status(Source::Nyt, &response(401)),
            Err(CollectorError::Auth(_))
        ));
        assert!(matches!(
            check_status(Source::Flickr, &response(403)),
            Err(CollectorError::Auth(_))
        ));
        assert!(matches!(
            check_status(Source::Nyt, &response(429)),
            Err(CollectorError::RateLimited(_))
        ));
        assert!(matches!(
            check_status(Source::Nyt, &response(503)),
            Err(CollectorError::Network(_))
        ));
    }
}
