//! Registration of all phase metrics with conflict detection

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub fn register_all_metrics() {
    let mut all_metrics: HashMap<&'static str, (&'static str, MetricDoc)> = HashMap::new();

    register_phase_metrics::<super::sources::SourcesMetrics>(&mut all_metrics);
    register_phase_metrics::<super::analysis::AnalysisMetrics>(&mut all_metrics);

    info!("Registered {} metrics across all phases", all_metrics.len());
    for (name, (phase, doc)) in &all_metrics {
        debug!("{} [{}] {:?}: {}", name, phase, doc.metric_type, doc.help);
    }
}

fn register_phase_metrics<T: PhaseMetrics>(
    all_metrics: &mut HashMap<&'static str, (&'static str, MetricDoc)>,
) {
    T::register_metrics();
    let phase_name = T::phase_name();
    for doc in T::metrics_documentation() {
        if let Some((existing_phase, _)) = all_metrics.get(doc.name) {
            warn!(
                "Metric name conflict: '{}' is defined by both '{}' and '{}'",
                doc.name, existing_phase, phase_name
            );
        } else {
            all_metrics.insert(doc.name, (phase_name, doc));
        }
    }
}

/// Every documented metric, in registration order
pub fn all_metric_docs() -> Vec<MetricDoc> {
    let mut docs = super::sources::SourcesMetrics::metrics_documentation();
    docs.extend(super::analysis::AnalysisMetrics::metrics_documentation());
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn metric_names_are_unique() {
        let docs = all_metric_docs();
        let names: HashSet<&str> = docs.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), docs.len());
    }
}
