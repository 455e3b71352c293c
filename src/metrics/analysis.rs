//! Analysis phase metrics: scoring and aggregation.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};
use crate::types::{SentimentLabel, Source};

pub struct AnalysisMetrics;

impl AnalysisMetrics {
    pub fn record_scored(source: Source, label: SentimentLabel) {
        let label = match label {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        };
        ::metrics::counter!(
            phase_metric!(counter, "analysis", "records_scored"),
            "source" => source.name(),
            "label" => label
        )
        .increment(1);
    }

    pub fn record_run(buckets: usize, warnings: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "analysis", "runs")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "analysis", "buckets_built")).increment(buckets as u64);
        ::metrics::counter!(phase_metric!(counter, "analysis", "source_warnings")).increment(warnings as u64);
        ::metrics::histogram!(phase_metric!(histogram, "analysis", "run_duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_rejected_query() {
        ::metrics::counter!(phase_metric!(counter, "analysis", "rejected_queries")).increment(1);
    }
}

impl PhaseMetrics for AnalysisMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "analysis", "records_scored"));
        let _ = counter!(phase_metric!(counter, "analysis", "runs"));
        let _ = counter!(phase_metric!(counter, "analysis", "buckets_built"));
        let _ = counter!(phase_metric!(counter, "analysis", "source_warnings"));
        let _ = counter!(phase_metric!(counter, "analysis", "rejected_queries"));
        let _ = histogram!(phase_metric!(histogram, "analysis", "run_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "analysis"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "analysis", "records_scored"),
                metric_type: MetricType::Counter,
                help: "Records normalized and scored",
                labels: vec!["source", "label"],
            },
            MetricDoc {
                name: phase_metric!(counter, "analysis", "runs"),
                metric_type: MetricType::Counter,
                help: "Completed pipeline runs",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "analysis", "buckets_built"),
                metric_type: MetricType::Counter,
                help: "Aggregate buckets produced",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "analysis", "source_warnings"),
                metric_type: MetricType::Counter,
                help: "Sources reported unavailable in a run",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "analysis", "rejected_queries"),
                metric_type: MetricType::Counter,
                help: "Queries rejected by input validation",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "analysis", "run_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "End-to-end pipeline run duration in seconds",
                labels: vec![],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_convention() {
        for doc in AnalysisMetrics::metrics_documentation() {
            assert!(doc.name.starts_with("spectra_analysis_"));
        }
    }
}
