use crate::constants::{
    FLICKR_DISPLAY, FLICKR_SOURCE, NEGATIVE_THRESHOLD, NYT_DISPLAY, NYT_SOURCE, POSITIVE_THRESHOLD,
    REDDIT_DISPLAY, REDDIT_SOURCE,
};
use crate::error::{CollectorError, Result, SpectraError};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// External text sources. Ordering drives bucket ordering in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Flickr,
    Nyt,
    Reddit,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Flickr, Source::Nyt, Source::Reddit];

    /// Lowercase name used on the command line and in config
    pub fn name(&self) -> &'static str {
        match self {
            Source::Flickr => FLICKR_SOURCE,
            Source::Nyt => NYT_SOURCE,
            Source::Reddit => REDDIT_SOURCE,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Source::Flickr => FLICKR_DISPLAY,
            Source::Nyt => NYT_DISPLAY,
            Source::Reddit => REDDIT_DISPLAY,
        }
    }

    /// Parse a comma-separated list such as `flickr,nyt`. "all" selects every source.
    pub fn parse_list(list: &str) -> Result<BTreeSet<Source>> {
        if list.trim().eq_ignore_ascii_case("all") {
            return Ok(Source::ALL.into_iter().collect());
        }
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Source {
    type Err = SpectraError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "flickr" => Ok(Source::Flickr),
            "nyt" | "new_york_times" | "newyorktimes" | "new york times" => Ok(Source::Nyt),
            "reddit" => Ok(Source::Reddit),
            other => Err(SpectraError::Input(format!("unknown source '{other}'"))),
        }
    }
}

/// One item of text as returned by a collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub source: Source,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub identifier: String,
}

/// Inclusive calendar-day range used for collection queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Parse two `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|e| SpectraError::Input(format!("invalid date '{s}': {e}")))
        };
        Self::new(parse(start)?, parse(end)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(SpectraError::Input(format!(
                "date range start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Midnight UTC at the start of the first day
    pub fn start_datetime(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.start.and_time(NaiveTime::default()))
    }

    /// Midnight UTC after the last day (exclusive bound)
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&(self.end + Duration::days(1)).and_time(NaiveTime::default()))
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        let day = timestamp.date_naive();
        day >= self.start && day <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Time unit used to group records into buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    /// ISO weeks, starting Monday
    Week,
    Month,
}

impl Granularity {
    /// First calendar day of the bucket that contains `timestamp`
    pub fn bucket_start(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        let day = timestamp.date_naive();
        match self {
            Granularity::Day => day,
            Granularity::Week => {
                day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
            }
            Granularity::Month => day.with_day(1).unwrap_or(day),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        };
        f.write_str(name)
    }
}

impl FromStr for Granularity {
    type Err = SpectraError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "d" | "daily" => Ok(Granularity::Day),
            "week" | "w" | "weekly" => Ok(Granularity::Week),
            "month" | "m" | "monthly" => Ok(Granularity::Month),
            other => Err(SpectraError::Input(format!("unknown granularity '{other}'"))),
        }
    }
}

/// Normalized, lemmatized, stopword-free lowercase text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalText(String);

impl CanonicalText {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }
}

impl fmt::Display for CanonicalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    /// Fixed threshold rule on the compound polarity
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if polarity <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Positive",
        };
        f.write_str(name)
    }
}

/// A raw record after normalization and scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: RawRecord,
    pub polarity: f64,
    pub label: SentimentLabel,
    /// Canonical tokens that carried non-zero valence
    pub emotion_words: Vec<String>,
}

/// Summary of one (source, time bucket) group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateBucket {
    pub source: Source,
    pub time_bucket: NaiveDate,
    pub count: usize,
    pub mean_polarity: f64,
    pub positive_count: usize,
    pub neutral_count: usize,
    pub negative_count: usize,
    pub positive_examples: Vec<ScoredRecord>,
    pub negative_examples: Vec<ScoredRecord>,
}

/// Core trait that every text source must implement
#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    /// Which source this collector serves
    fn source(&self) -> Source;

    /// Fetch records matching `keyword` whose timestamps fall inside `range`
    async fn fetch(
        &self,
        keyword: &str,
        range: &DateRange,
    ) -> std::result::Result<Vec<RawRecord>, CollectorError>;
}
