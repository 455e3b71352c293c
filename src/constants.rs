/// Source name constants to keep CLI, config and storage names consistent.
/// CLI / config names are lowercase; display names are what the dashboard shows.

// CLI / config names
pub const FLICKR_SOURCE: &str = "flickr";
pub const NYT_SOURCE: &str = "nyt";
pub const REDDIT_SOURCE: &str = "reddit";

// Display names
pub const FLICKR_DISPLAY: &str = "Flickr";
pub const NYT_DISPLAY: &str = "NYT";
pub const REDDIT_DISPLAY: &str = "Reddit";

// Endpoints
pub const FLICKR_REST_URL: &str = "https://www.flickr.com/services/rest/";
pub const NYT_ARTICLE_SEARCH_URL: &str = "https://api.nytimes.com/svc/search/v2/articlesearch.json";

/// NYT Article Search returns fixed pages of ten documents
pub const NYT_PAGE_SIZE: usize = 10;
/// NYT refuses page numbers above 100
pub const NYT_MAX_PAGES: usize = 100;

/// Flickr comments at or below this length after cleaning carry no signal
pub const FLICKR_MIN_COMMENT_LEN: usize = 3;

pub const DEFAULT_REDDIT_DATA_FILE: &str = "reddit_comments.csv";
pub const DEFAULT_CONFIG_FILE: &str = "spectra.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

pub const DEFAULT_MAX_RESULTS: usize = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REQUESTS_PER_MINUTE: u64 = 60;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_TOP_N: usize = 5;

/// Longest keyword accepted by the orchestrator
pub const MAX_KEYWORD_LEN: usize = 200;

// Label thresholds on the compound polarity
pub const POSITIVE_THRESHOLD: f64 = 0.05;
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

pub const DEFAULT_SEARCH_TERMS: &[&str] = &[
    "gaza",
    "palestine",
    "israel",
    "hamas",
    "palestinian refugees",
    "israel palestine conflict",
];

pub const DEFAULT_START_DATE: &str = "2023-01-01";
pub const DEFAULT_END_DATE: &str = "2024-11-01";

/// Largest valence magnitude accepted from configuration (the base lexicon's scale)
pub const MAX_VALENCE: f64 = 4.0;

/// Topical lexicon layered on top of the base lexicon. Entries from the config's
/// `[analysis.custom_lexicon]` table are layered over these.
/// Values are raw valences on the base lexicon's scale.
pub const DEFAULT_CUSTOM_LEXICON: &[(&str, f64)] = &[
    // Negative terms
    ("casualty", -0.6),
    ("death", -0.8),
    ("kill", -0.8),
    ("injure", -0.6),
    ("wound", -0.6),
    ("displace", -0.5),
    ("displacement", -0.5),
    ("refugee", -0.4),
    ("destruction", -0.7),
    ("destroy", -0.7),
    ("damage", -0.5),
    ("crisis", -0.6),
    ("conflict", -0.4),
    ("violence", -0.7),
    ("violent", -0.7),
    ("attack", -0.6),
    ("siege", -0.6),
    ("blockade", -0.5),
    ("suffer", -0.7),
    ("hostage", -0.8),
    // Positive terms
    ("peace", 0.8),
    ("peaceful", 0.7),
    ("ceasefire", 0.6),
    ("truce", 0.6),
    ("negotiation", 0.5),
    ("diplomatic", 0.5),
    ("diplomacy", 0.5),
    ("agreement", 0.6),
    ("resolution", 0.6),
    ("dialogue", 0.6),
    ("humanitarian", 0.5),
    ("aid", 0.6),
    ("assistance", 0.5),
    ("support", 0.4),
    ("relief", 0.5),
    ("reconciliation", 0.7),
    ("stability", 0.6),
    ("stable", 0.5),
    ("protect", 0.5),
    ("protection", 0.5),
    ("safety", 0.6),
    ("safe", 0.6),
    ("rebuild", 0.5),
];

/// Get all supported source names
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![FLICKR_SOURCE, NYT_SOURCE, REDDIT_SOURCE]
}
