//! Phase-organized metrics for the sentiment pipeline
//!
//! Each phase defines its own metrics in a dedicated submodule. Recording is
//! always safe: without an installed recorder the `metrics` macros are no-ops.

pub mod analysis;
pub mod registry;
pub mod sources;

pub use analysis::AnalysisMetrics;
pub use sources::SourcesMetrics;

use std::net::SocketAddr;
use std::sync::Once;
use tracing::{info, warn};

static INIT: Once = Once::new();

/// Environment variable holding the Prometheus listener address
pub const METRICS_ADDR_ENV: &str = "SPECTRA_METRICS_ADDR";

/// Install the Prometheus exporter if `SPECTRA_METRICS_ADDR` is set.
///
/// Idempotent. Returns the listener address when this call started the exporter.
pub fn init_metrics() -> Option<SocketAddr> {
    let addr_str = std::env::var(METRICS_ADDR_ENV).ok()?;
    let addr = match addr_str.trim().parse::<SocketAddr>() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid {} '{}': {}", METRICS_ADDR_ENV, addr_str, e);
            return None;
        }
    };

    let mut started = false;
    INIT.call_once(|| {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
        match builder.install() {
            Ok(()) => {
                info!("Prometheus exporter listening at http://{}/metrics", addr);
                registry::register_all_metrics();
                started = true;
            }
            Err(e) => warn!("Failed to install Prometheus exporter: {}", e),
        }
    });
    started.then_some(addr)
}

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Pre-register so every series shows up before first use
    fn register_metrics();

    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Metric names follow spectra_{phase}_{name}[_total]
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("spectra_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("spectra_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("spectra_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
