// Sentiment pipeline: processing stages, orchestration and export

pub mod export;
pub mod orchestrator;
pub mod processing;

pub use orchestrator::{RunOutcome, SentimentPipeline, SentimentQuery, SourceWarning};
pub use processing::aggregate::aggregate;
pub use processing::normalize::normalize;
pub use processing::sentiment::{analyze, score};
