//! Source collection metrics: requests, latency and records per source.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};
use crate::types::Source;

pub struct SourcesMetrics;

impl SourcesMetrics {
    pub fn record_request_success(source: Source, duration_secs: f64, payload_bytes: usize) {
        ::metrics::counter!(phase_metric!(counter, "sources", "requests_success"), "source" => source.name())
            .increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "sources", "request_duration_seconds"), "source" => source.name())
            .record(duration_secs);
        ::metrics::histogram!(phase_metric!(histogram, "sources", "payload_bytes"), "source" => source.name())
            .record(payload_bytes as f64);
    }

    pub fn record_request_error(source: Source, error_type: &'static str) {
        ::metrics::counter!(
            phase_metric!(counter, "sources", "requests_error"),
            "source" => source.name(),
            "error_type" => error_type
        )
        .increment(1);
    }

    /// One completed collector fetch, as seen by the orchestrator
    pub fn record_fetch(source: Source, records: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "sources", "records_fetched"), "source" => source.name())
            .increment(records as u64);
        ::metrics::histogram!(phase_metric!(histogram, "sources", "fetch_duration_seconds"), "source" => source.name())
            .record(duration_secs);
    }

    pub fn record_unavailable(source: Source, error_type: &'static str) {
        ::metrics::counter!(
            phase_metric!(counter, "sources", "unavailable"),
            "source" => source.name(),
            "error_type" => error_type
        )
        .increment(1);
    }

    pub fn record_cache_hit(source: Source) {
        ::metrics::counter!(phase_metric!(counter, "sources", "cache_hits"), "source" => source.name())
            .increment(1);
    }
}

impl PhaseMetrics for SourcesMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "sources", "requests_success"));
        let _ = counter!(phase_metric!(counter, "sources", "requests_error"));
        let _ = counter!(phase_metric!(counter, "sources", "records_fetched"));
        let _ = counter!(phase_metric!(counter, "sources", "unavailable"));
        let _ = counter!(phase_metric!(counter, "sources", "cache_hits"));
        let _ = histogram!(phase_metric!(histogram, "sources", "request_duration_seconds"));
        let _ = histogram!(phase_metric!(histogram, "sources", "payload_bytes"));
        let _ = histogram!(phase_metric!(histogram, "sources", "fetch_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "sources"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "sources", "requests_success"),
                metric_type: MetricType::Counter,
                help: "Successful HTTP requests to external sources",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "sources", "requests_error"),
                metric_type: MetricType::Counter,
                help: "Failed HTTP requests to external sources",
                labels: vec!["source", "error_type"],
            },
            MetricDoc {
                name: phase_metric!(counter, "sources", "records_fetched"),
                metric_type: MetricType::Counter,
                help: "Raw records returned by collectors",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(counter, "sources", "unavailable"),
                metric_type: MetricType::Counter,
                help: "Collector fetches that failed and were skipped",
                labels: vec!["source", "error_type"],
            },
            MetricDoc {
                name: phase_metric!(counter, "sources", "cache_hits"),
                metric_type: MetricType::Counter,
                help: "Collector fetches served from the response cache",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "sources", "request_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Duration of single HTTP requests in seconds",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "sources", "payload_bytes"),
                metric_type: MetricType::Histogram,
                help: "Size of HTTP response bodies in bytes",
                labels: vec!["source"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "sources", "fetch_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Duration of whole collector fetches in seconds",
                labels: vec!["source"],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_harmless() {
        SourcesMetrics::register_metrics();
        SourcesMetrics::record_fetch(Source::Nyt, 10, 0.5);
        SourcesMetrics::record_unavailable(Source::Flickr, "auth");
    }

    #[test]
    fn names_follow_convention() {
        let docs = SourcesMetrics::metrics_documentation();
        assert_eq!(docs.len(), 8);
        for doc in docs {
            assert!(doc.name.starts_with("spectra_sources_"));
        }
    }
}
