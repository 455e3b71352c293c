use crate::constants::*;
use crate::error::{Result, SpectraError};
use crate::types::{DateRange, Granularity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub collection: CollectionConfig,
    pub analysis: AnalysisConfig,
    pub defaults: QueryDefaults,
    pub reddit: RedditConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Upper bound on records requested per source
    pub max_results: usize,
    pub request_timeout_secs: u64,
    pub requests_per_minute: u64,
    /// Zero disables the response cache
    pub cache_ttl_secs: u64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub granularity: Granularity,
    pub top_n: usize,
    /// Word → valence overrides layered over the built-in topical terms
    pub custom_lexicon: BTreeMap<String, f64>,
}

impl AnalysisConfig {
    /// Built-in topical entries with the configured table layered on top
    pub fn lexicon_entries(&self) -> BTreeMap<String, f64> {
        let mut entries: BTreeMap<String, f64> = DEFAULT_CUSTOM_LEXICON
            .iter()
            .map(|(word, valence)| (word.to_string(), *valence))
            .collect();
        entries.extend(self.custom_lexicon.iter().map(|(word, valence)| (word.clone(), *valence)));
        entries
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Day,
            top_n: DEFAULT_TOP_N,
            custom_lexicon: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
    pub keywords: Vec<String>,
    pub start_date: String,
    pub end_date: String,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_SEARCH_TERMS.iter().map(|s| s.to_string()).collect(),
            start_date: DEFAULT_START_DATE.to_string(),
            end_date: DEFAULT_END_DATE.to_string(),
        }
    }
}

impl QueryDefaults {
    pub fn date_range(&self) -> Result<DateRange> {
        DateRange::parse(&self.start_date, &self.end_date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub data_file: PathBuf,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_REDDIT_DATA_FILE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path, or from `spectra.toml` when present, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SpectraError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis.top_n == 0 {
            return Err(SpectraError::Config("analysis.top_n must be at least 1".into()));
        }
        if self.collection.request_timeout_secs == 0 {
            return Err(SpectraError::Config(
                "collection.request_timeout_secs must be positive".into(),
            ));
        }
        if self.collection.max_results == 0 {
            return Err(SpectraError::Config("collection.max_results must be positive".into()));
        }
        if let Some((word, valence)) = self
            .analysis
            .custom_lexicon
            .iter()
            .find(|(_, valence)| !valence.is_finite() || valence.abs() > MAX_VALENCE)
        {
            return Err(SpectraError::Config(format!(
                "custom lexicon entry '{word}' = {valence} is outside -{MAX_VALENCE}..{MAX_VALENCE}"
            )));
        }
        Ok(())
    }
}

/// API credentials, read from the environment (and `.env` if present)
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub flickr_api_key: Option<String>,
    pub nyt_api_key: Option<String>,
    pub reddit_data_file: Option<PathBuf>,
}

impl Credentials {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let non_empty = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            flickr_api_key: non_empty("FLICKR_API_KEY"),
            nyt_api_key: non_empty("NYT_API_KEY"),
            reddit_data_file: non_empty("REDDIT_DATA_FILE").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.analysis.top_n, DEFAULT_TOP_N);
        assert!(config.analysis.lexicon_entries().contains_key("ceasefire"));
        assert!(config.defaults.date_range().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[analysis]\ngranularity = \"week\"\ntop_n = 3\n\n[analysis.custom_lexicon]\ntruce = 1.5\n\n[collection]\nmax_results = 20"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.analysis.granularity, Granularity::Week);
        assert_eq!(config.analysis.top_n, 3);
        assert_eq!(config.analysis.custom_lexicon.get("truce"), Some(&1.5));
        assert_eq!(config.collection.max_results, 20);
        assert_eq!(config.collection.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.reddit.data_file, PathBuf::from(DEFAULT_REDDIT_DATA_FILE));
    }

    #[test]
    fn custom_table_layers_over_builtin_terms() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis.custom_lexicon]\ntruce = 1.5\npeace = 2.0").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        let entries = config.analysis.lexicon_entries();
        assert_eq!(entries.get("truce"), Some(&1.5));
        assert_eq!(entries.get("peace"), Some(&2.0));
        assert!(entries.contains_key("ceasefire"));
        assert!(entries.contains_key("hostage"));
    }

    #[test]
    fn out_of_scale_valence_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis.custom_lexicon]\ntruce = 1e308").unwrap();
        assert!(matches!(
            AppConfig::load(Some(file.path())),
            Err(SpectraError::Config(_))
        ));

        let mut config = AppConfig::default();
        config.analysis.custom_lexicon.insert("peace".into(), -4.0);
        assert!(config.validate().is_ok());
        config.analysis.custom_lexicon.insert("peace".into(), 4.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn credentials_keep_only_non_empty_values() {
        std::env::set_var("FLICKR_API_KEY", " flickr-key ");
        std::env::set_var("NYT_API_KEY", "   ");
        let credentials = Credentials::from_env();
        std::env::remove_var("FLICKR_API_KEY");
        std::env::remove_var("NYT_API_KEY");

        assert_eq!(credentials.flickr_api_key.as_deref(), Some("flickr-key"));
        assert_eq!(credentials.nyt_api_key, None);
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analysis]\ntop_n = 0").unwrap();
        assert!(matches!(
            AppConfig::load(Some(file.path())),
            Err(SpectraError::Config(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/spectra.toml")));
        assert!(matches!(result, Err(SpectraError::Config(_))));
    }
}
