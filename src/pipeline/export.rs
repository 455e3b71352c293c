//! Flat tables for the visualization layer, written as CSV or a JSON document.

use crate::error::Result;
use crate::pipeline::orchestrator::{RunOutcome, SourceWarning};
use crate::types::{AggregateBucket, ScoredRecord, SentimentLabel, Source};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const BUCKETS_FILE: &str = "buckets.csv";
pub const POSITIVE_EXAMPLES_FILE: &str = "positive_examples.csv";
pub const NEGATIVE_EXAMPLES_FILE: &str = "negative_examples.csv";
pub const JSON_FILE: &str = "sentiment.json";

const BUCKET_COLUMNS: &[&str] = &[
    "source",
    "time_bucket",
    "count",
    "mean_polarity",
    "positive_count",
    "neutral_count",
    "negative_count",
];
const EXAMPLE_COLUMNS: &[&str] = &[
    "source",
    "time_bucket",
    "rank",
    "identifier",
    "timestamp",
    "polarity",
    "label",
    "text",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketRow {
    pub source: Source,
    pub time_bucket: NaiveDate,
    pub count: usize,
    pub mean_polarity: f64,
    pub positive_count: usize,
    pub neutral_count: usize,
    pub negative_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleRow {
    pub source: Source,
    pub time_bucket: NaiveDate,
    /// 1-based position within the bucket's example list
    pub rank: usize,
    pub identifier: String,
    pub timestamp: DateTime<Utc>,
    pub polarity: f64,
    pub label: SentimentLabel,
    pub text: String,
}

impl ExampleRow {
    fn from_record(bucket: &AggregateBucket, rank: usize, record: &ScoredRecord) -> Self {
        Self {
            source: bucket.source,
            time_bucket: bucket.time_bucket,
            rank,
            identifier: record.record.identifier.clone(),
            timestamp: record.record.timestamp,
            polarity: record.polarity,
            label: record.label,
            text: record.record.text.clone(),
        }
    }
}

/// The visualization contract: one summary table plus two example side-tables
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisualizationTables {
    pub buckets: Vec<BucketRow>,
    pub positive_examples: Vec<ExampleRow>,
    pub negative_examples: Vec<ExampleRow>,
}

impl VisualizationTables {
    pub fn from_buckets(buckets: &[AggregateBucket]) -> Self {
        let mut tables = Self::default();
        for bucket in buckets {
            tables.buckets.push(BucketRow {
                source: bucket.source,
                time_bucket: bucket.time_bucket,
                count: bucket.count,
                mean_polarity: bucket.mean_polarity,
                positive_count: bucket.positive_count,
                neutral_count: bucket.neutral_count,
                negative_count: bucket.negative_count,
            });
            tables.positive_examples.extend(
                bucket
                    .positive_examples
                    .iter()
                    .enumerate()
                    .map(|(i, r)| ExampleRow::from_record(bucket, i + 1, r)),
            );
            tables.negative_examples.extend(
                bucket
                    .negative_examples
                    .iter()
                    .enumerate()
                    .map(|(i, r)| ExampleRow::from_record(bucket, i + 1, r)),
            );
        }
        tables
    }

    /// Write the three tables as CSV files into `dir`, returning their paths
    pub fn write_csv(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let paths = vec![
            dir.join(BUCKETS_FILE),
            dir.join(POSITIVE_EXAMPLES_FILE),
            dir.join(NEGATIVE_EXAMPLES_FILE),
        ];
        write_rows(&paths[0], BUCKET_COLUMNS, &self.buckets)?;
        write_rows(&paths[1], EXAMPLE_COLUMNS, &self.positive_examples)?;
        write_rows(&paths[2], EXAMPLE_COLUMNS, &self.negative_examples)?;
        info!("Wrote {} bucket rows to {}", self.buckets.len(), dir.display());
        Ok(paths)
    }
}

/// Everything a dashboard needs from one run, as a single JSON document
#[derive(Debug, Clone, Serialize)]
pub struct SentimentReport<'a> {
    pub keyword: &'a str,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub records_scored: usize,
    pub warnings: &'a [SourceWarning],
    #[serde(flatten)]
    pub tables: VisualizationTables,
}

impl<'a> SentimentReport<'a> {
    pub fn new(keyword: &'a str, start: NaiveDate, end: NaiveDate, outcome: &'a RunOutcome) -> Self {
        Self {
            keyword,
            start,
            end,
            records_scored: outcome.records_scored,
            warnings: &outcome.warnings,
            tables: VisualizationTables::from_buckets(&outcome.buckets),
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(self)?;
        fs::write(path, body)?;
        info!("Wrote report to {}", path.display());
        Ok(())
    }
}

/// Serialized rows carry their own header; an empty table still gets `columns`
fn write_rows<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(columns)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
