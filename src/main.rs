use anyhow::Context;
use clap::{Parser, Subcommand};
use spectra_sentiment::apis::factory::create_collectors;
use spectra_sentiment::config::{AppConfig, Credentials};
use spectra_sentiment::infra::http_client::ReqwestHttp;
use spectra_sentiment::infra::rate_limiter::RateLimiter;
use spectra_sentiment::logging;
use spectra_sentiment::metrics;
use spectra_sentiment::pipeline::export::{SentimentReport, VisualizationTables, JSON_FILE};
use spectra_sentiment::pipeline::processing::sentiment::{install_lexicon, shared_lexicon, Lexicon};
use spectra_sentiment::pipeline::{normalize, RunOutcome, SentimentPipeline, SentimentQuery};
use spectra_sentiment::server::{start_server, ServerState};
use spectra_sentiment::types::{DateRange, Granularity, Source};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "spectra_sentiment")]
#[command(about = "Keyword sentiment across Flickr comments, NYT articles and Reddit posts")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./spectra.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect, score and aggregate sentiment for a keyword
    Analyze {
        /// Keyword to search for. Without it every configured default keyword is analyzed
        #[arg(long, short)]
        keyword: Option<String>,
        /// Sources to query (comma-separated). Available: flickr, nyt, reddit, all
        #[arg(long, default_value = "all")]
        sources: String,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// Last day (inclusive), YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
        /// day, week or month
        #[arg(long)]
        granularity: Option<Granularity>,
        /// Examples kept per bucket and polarity
        #[arg(long)]
        top_n: Option<usize>,
        /// Output directory for the CSV tables and JSON report
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Score a single piece of text
    Score {
        #[arg(long, short)]
        text: String,
    },
    /// Serve the sentiment API over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
    /// Show which sources are configured
    Sources,
}

fn build_pipeline(config: &AppConfig, credentials: &Credentials) -> anyhow::Result<SentimentPipeline> {
    let http = ReqwestHttp::new(Duration::from_secs(config.collection.request_timeout_secs))
        .context("building HTTP client")?;
    let limiter = RateLimiter::per_minute(config.collection.requests_per_minute);
    let collectors = create_collectors(config, credentials, Arc::new(http), Arc::new(limiter));
    Ok(SentimentPipeline::from_config(config, collectors))
}

/// Directory-safe form of a keyword
fn slug(keyword: &str) -> String {
    keyword
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn print_outcome(keyword: &str, range: &DateRange, outcome: &RunOutcome) {
    println!("\n📊 Sentiment for '{}' ({}):", keyword, range);
    println!("   Records scored: {}", outcome.records_scored);
    for (source, count) in &outcome.per_source_counts {
        println!("   {}: {} records", source, count);
    }
    for bucket in &outcome.buckets {
        println!(
            "   {} {} n={} mean={:+.3} (+{} ={} -{})",
            bucket.source,
            bucket.time_bucket,
            bucket.count,
            bucket.mean_polarity,
            bucket.positive_count,
            bucket.neutral_count,
            bucket.negative_count
        );
    }
    if outcome.is_partial() {
        println!("\n⚠️  Sources skipped:");
        for warning in &outcome.warnings {
            println!("   - {}: {}", warning.source, warning.error);
        }
    }
}

fn write_outputs(dir: &Path, keyword: &str, range: &DateRange, outcome: &RunOutcome) -> anyhow::Result<()> {
    VisualizationTables::from_buckets(&outcome.buckets)
        .write_csv(dir)
        .with_context(|| format!("writing CSV tables to {}", dir.display()))?;
    SentimentReport::new(keyword, range.start, range.end, outcome)
        .write_json(&dir.join(JSON_FILE))
        .with_context(|| format!("writing JSON report to {}", dir.display()))?;
    println!("   Output: {}", dir.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = logging::init_logging();
    metrics::init_metrics();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let credentials = Credentials::from_env();

    if !install_lexicon(Lexicon::base().with_custom(config.analysis.lexicon_entries())) {
        warn!("Lexicon already installed; custom entries ignored");
    }
    info!("Lexicon ready with {} entries", shared_lexicon().len());

    match cli.command {
        Commands::Analyze {
            keyword,
            sources,
            start,
            end,
            granularity,
            top_n,
            output,
        } => {
            println!("🔄 Running sentiment pipeline...");
            let sources = Source::parse_list(&sources)?;
            let range = DateRange::parse(
                start.as_deref().unwrap_or(&config.defaults.start_date),
                end.as_deref().unwrap_or(&config.defaults.end_date),
            )?;
            let output_dir = output.unwrap_or_else(|| config.output.dir.clone());
            let pipeline = build_pipeline(&config, &credentials)?;

            let keywords = match keyword {
                Some(keyword) => vec![keyword],
                None => config.defaults.keywords.clone(),
            };
            let many = keywords.len() > 1;

            for keyword in &keywords {
                let mut query = SentimentQuery::new(sources.clone(), keyword.as_str(), range);
                query.granularity = granularity;
                query.top_n = top_n;

                match pipeline.run_query(&query).await {
                    Ok(outcome) => {
                        print_outcome(keyword.trim(), &range, &outcome);
                        let dir = if many {
                            output_dir.join(slug(keyword))
                        } else {
                            output_dir.clone()
                        };
                        write_outputs(&dir, keyword.trim(), &range, &outcome)?;
                    }
                    Err(e) => {
                        error!("Sentiment run for '{}' failed: {}", keyword, e);
                        println!("❌ '{}' failed: {}", keyword, e);
                        if !many {
                            return Err(e.into());
                        }
                    }
                }
            }
            println!("\n✅ Sentiment pipeline completed");
        }
        Commands::Score { text } => {
            let canonical = normalize(&text);
            let score = shared_lexicon().analyze(&canonical);
            println!("Canonical: {}", canonical);
            println!("Polarity:  {:+.4}", score.polarity);
            println!("Label:     {}", score.label);
            if !score.emotion_words.is_empty() {
                println!("Emotion words: {}", score.emotion_words.join(", "));
            }
        }
        Commands::Serve { addr } => {
            let pipeline = build_pipeline(&config, &credentials)?;
            let state = Arc::new(ServerState {
                pipeline: Arc::new(pipeline),
                defaults: config.defaults.clone(),
            });
            start_server(state, addr).await?;
        }
        Commands::Sources => {
            let pipeline = build_pipeline(&config, &credentials)?;
            let configured = pipeline.configured_sources();
            for source in Source::ALL {
                let status = if configured.contains(&source) { "✅" } else { "❌" };
                println!("{} {} ({})", status, source, source.name());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_slugs_are_path_safe() {
        assert_eq!(slug(" Climate Change "), "climate_change");
        assert_eq!(slug("Gaza/Israel"), "gaza_israel");
    }

    #[test]
    fn cli_parses_analyze() {
        let cli = Cli::parse_from([
            "spectra_sentiment",
            "analyze",
            "--keyword",
            "gaza",
            "--sources",
            "nyt,reddit",
            "--granularity",
            "week",
        ]);
        match cli.command {
            Commands::Analyze { keyword, sources, granularity, .. } => {
                assert_eq!(keyword.as_deref(), Some("gaza"));
                assert_eq!(sources, "nyt,reddit");
                assert_eq!(granularity, Some(Granularity::Week));
            }
            _ => panic!("expected analyze"),
        }
    }
}
