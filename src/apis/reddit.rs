use crate::error::CollectorError;
use crate::types::{Collector, DateRange, RawRecord, Source};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

const TEXT_COLUMNS: &[&str] = &["self_text", "text", "body", "comment_text"];
const TIME_COLUMNS: &[&str] = &["created_time", "created_utc", "date"];
const ID_COLUMNS: &[&str] = &["comment_id", "id"];

/// Reads a pre-downloaded Reddit comment export (CSV)
pub struct RedditCollector {
    data_file: PathBuf,
    max_results: usize,
}

impl RedditCollector {
    pub fn new(data_file: impl Into<PathBuf>, max_results: usize) -> Self {
        Self {
            data_file: data_file.into(),
            max_results,
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }
}

#[async_trait::async_trait]
impl Collector for RedditCollector {
    fn source(&self) -> Source {
        Source::Reddit
    }

    #[instrument(skip(self), fields(source = "reddit"))]
    async fn fetch(&self, keyword: &str, range: &DateRange) -> Result<Vec<RawRecord>, CollectorError> {
        let bytes = tokio::fs::read(&self.data_file).await.map_err(|e| {
            CollectorError::Io(format!("{}: {}", self.data_file.display(), e))
        })?;
        let mut records = parse_export(&bytes, keyword, range)?;
        records.truncate(self.max_results);
        info!(
            "Loaded {} matching Reddit comments from {}",
            records.len(),
            self.data_file.display()
        );
        Ok(records)
    }
}

struct Columns {
    text: usize,
    time: usize,
    id: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, CollectorError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let text = find(TEXT_COLUMNS).ok_or_else(|| {
            CollectorError::Malformed(format!("no text column (expected one of {TEXT_COLUMNS:?})"))
        })?;
        let time = find(TIME_COLUMNS).ok_or_else(|| {
            CollectorError::Malformed(format!("no time column (expected one of {TIME_COLUMNS:?})"))
        })?;
        Ok(Self {
            text,
            time,
            id: find(ID_COLUMNS),
        })
    }
}

/// Filter export rows by date range and case-insensitive keyword match
pub fn parse_export(bytes: &[u8], keyword: &str, range: &DateRange) -> Result<Vec<RawRecord>, CollectorError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(bytes);
    let columns = Columns::locate(reader.headers()?)?;
    let needle = keyword.trim().to_lowercase();

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.records() {
        let row = row?;
        let text = row.get(columns.text).unwrap_or_default().trim();
        if text.is_empty() || !text.to_lowercase().contains(&needle) {
            continue;
        }
        let Some(timestamp) = row.get(columns.time).and_then(parse_created_time) else {
            skipped += 1;
            continue;
        };
        if !range.contains(&timestamp) {
            continue;
        }
        let identifier = columns
            .id
            .and_then(|i| row.get(i))
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| content_id(&timestamp, text));
        records.push(RawRecord {
            source: Source::Reddit,
            text: text.to_string(),
            timestamp,
            identifier,
        });
    }

    if skipped > 0 {
        debug!("Skipped {} Reddit rows with unparseable timestamps", skipped);
    }
    Ok(records)
}

fn parse_created_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&day.and_time(Default::default())));
    }
    // Unix seconds, possibly written as a float by pandas
    raw.parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite())
        .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single())
}

/// Stable identifier for rows that carry none
fn content_id(timestamp: &DateTime<Utc>, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.to_rfc3339().as_bytes());
    hasher.update(b"|");
    hasher.update(text.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("reddit-{}", &digest[..16])
}
