use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpectraError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, SpectraError>;

/// Failures raised at the collector boundary. The orchestrator treats every
/// variant the same way: the source is reported unavailable and skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectorError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("data file unavailable: {0}")]
    Io(String),

    #[error("source not configured: {0}")]
    NotConfigured(String),
}

impl CollectorError {
    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            CollectorError::Network(_) => "network",
            CollectorError::Auth(_) => "auth",
            CollectorError::RateLimited(_) => "rate_limited",
            CollectorError::Malformed(_) => "malformed",
            CollectorError::Timeout(_) => "timeout",
            CollectorError::Io(_) => "io",
            CollectorError::NotConfigured(_) => "not_configured",
        }
    }
}

impl From<reqwest::Error> for CollectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CollectorError::Malformed(err.to_string())
        } else {
            CollectorError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CollectorError {
    fn from(err: serde_json::Error) -> Self {
        CollectorError::Malformed(err.to_string())
    }
}

impl From<csv::Error> for CollectorError {
    fn from(err: csv::Error) -> Self {
        CollectorError::Malformed(err.to_string())
    }
}

impl From<std::io::Error> for CollectorError {
    fn from(err: std::io::Error) -> Self {
        CollectorError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_error_kinds_are_stable() {
        assert_eq!(CollectorError::Auth("bad key".into()).kind(), "auth");
        assert_eq!(CollectorError::RateLimited("429".into()).kind(), "rate_limited");
        assert_eq!(CollectorError::Timeout(10).kind(), "timeout");
    }

    #[test]
    fn collector_error_converts_into_crate_error() {
        let err: SpectraError = CollectorError::Network("connection reset".into()).into();
        assert!(err.to_string().contains("connection reset"));
    }
}
