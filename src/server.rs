use crate::config::QueryDefaults;
use crate::error::SpectraError;
use crate::pipeline::export::SentimentReport;
use crate::pipeline::normalize;
use crate::pipeline::orchestrator::{SentimentPipeline, SentimentQuery};
use crate::types::{DateRange, Granularity, Source};
use axum::{
    extract::Query,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Shared state behind every request
pub struct ServerState {
    pub pipeline: Arc<SentimentPipeline>,
    pub defaults: QueryDefaults,
}

/// Query string for `/api/sentiment`. Missing values fall back to the configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct SentimentParams {
    pub keyword: Option<String>,
    /// Comma-separated source names, or "all"
    pub sources: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub granularity: Option<String>,
    pub top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreBody {
    pub text: String,
}

struct ApiError(SpectraError);

impl From<SpectraError> for ApiError {
    fn from(err: SpectraError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            SpectraError::Input(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "spectra-sentiment",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn list_sources(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    let configured = state.pipeline.configured_sources();
    let sources: Vec<_> = Source::ALL
        .iter()
        .map(|source| {
            serde_json::json!({
                "name": source.name(),
                "display_name": source.display_name(),
                "configured": configured.contains(source),
            })
        })
        .collect();
    Json(serde_json::json!({ "sources": sources }))
}

fn build_query(params: SentimentParams, defaults: &QueryDefaults) -> Result<SentimentQuery, SpectraError> {
    let keyword = match params.keyword {
        Some(keyword) => keyword,
        None => defaults
            .keywords
            .first()
            .cloned()
            .ok_or_else(|| SpectraError::Input("keyword is required".into()))?,
    };
    let sources = match params.sources.as_deref() {
        Some(list) => Source::parse_list(list)?,
        None => Source::ALL.into_iter().collect(),
    };
    let range = DateRange::parse(
        params.start.as_deref().unwrap_or(&defaults.start_date),
        params.end.as_deref().unwrap_or(&defaults.end_date),
    )?;
    let mut query = SentimentQuery::new(sources, keyword, range);
    query.granularity = params
        .granularity
        .as_deref()
        .map(str::parse::<Granularity>)
        .transpose()?;
    query.top_n = params.top_n;
    Ok(query)
}

async fn sentiment(
    Extension(state): Extension<Arc<ServerState>>,
    Query(params): Query<SentimentParams>,
) -> Result<Response, ApiError> {
    let query = build_query(params, &state.defaults)?;
    let outcome = state.pipeline.run_query(&query).await?;
    let keyword = query.keyword.trim();
    let report = SentimentReport::new(keyword, query.range.start, query.range.end, &outcome);
    Ok(Json(report).into_response())
}

async fn score_text(
    Extension(state): Extension<Arc<ServerState>>,
    Json(body): Json<ScoreBody>,
) -> impl IntoResponse {
    let canonical = normalize(&body.text);
    let score = state.pipeline.lexicon().analyze(&canonical);
    Json(serde_json::json!({
        "canonical": canonical,
        "polarity": score.polarity,
        "label": score.label,
        "emotion_words": score.emotion_words,
    }))
}

/// Create the HTTP router with all routes
pub fn create_server(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/sources", get(list_sources))
        .route("/api/sentiment", get(sentiment))
        .route("/api/score", post(score_text))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the given address
pub async fn start_server(state: Arc<ServerState>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_server(state);

    info!("🚀 HTTP server running on http://{}", addr);
    info!("💚 Health check: http://{}/health", addr);
    info!("📈 Sentiment:    http://{}/api/sentiment?keyword=...", addr);

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectorError;
    use crate::types::{Collector, RawRecord};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    struct FixedCollector;

    #[async_trait::async_trait]
    impl Collector for FixedCollector {
        fn source(&self) -> Source {
            Source::Nyt
        }

        async fn fetch(&self, _keyword: &str, _range: &DateRange) -> Result<Vec<RawRecord>, CollectorError> {
            Ok(vec![RawRecord {
                source: Source::Nyt,
                text: "A wonderful and hopeful day".into(),
                timestamp: Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap(),
                identifier: "nyt-1".into(),
            }])
        }
    }

    fn app() -> Router {
        let mut collectors: BTreeMap<Source, Arc<dyn Collector>> = BTreeMap::new();
        collectors.insert(Source::Nyt, Arc::new(FixedCollector));
        create_server(Arc::new(ServerState {
            pipeline: Arc::new(SentimentPipeline::new(collectors)),
            defaults: QueryDefaults::default(),
        }))
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn sources_show_configuration() {
        let (_, body) = get_json("/api/sources").await;
        let sources = body["sources"].as_array().unwrap();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[1]["name"], "nyt");
        assert_eq!(sources[1]["configured"], true);
        assert_eq!(sources[0]["configured"], false);
    }

    #[tokio::test]
    async fn sentiment_returns_report() {
        let (status, body) =
            get_json("/api/sentiment?keyword=climate&sources=nyt&start=2024-01-01&end=2024-01-31").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["keyword"], "climate");
        assert_eq!(body["records_scored"], 1);
        assert_eq!(body["buckets"][0]["source"], "nyt");
        assert!(body["buckets"][0]["mean_polarity"].as_f64().unwrap() > 0.0);
        assert!(body["warnings"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_source_is_a_warning_not_an_error() {
        let (status, body) =
            get_json("/api/sentiment?keyword=climate&sources=all&start=2024-01-01&end=2024-01-31").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["warnings"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn bad_input_is_400() {
        let (status, body) =
            get_json("/api/sentiment?keyword=climate&start=2024-02-01&end=2024-01-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("after end"));

        let (status, _) = get_json("/api/sentiment?keyword=climate&sources=myspace").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn score_endpoint_labels_text() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/score")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text":"I don't hate this at all, it's great!!!"}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["canonical"], "not hate great");
        assert_eq!(body["label"], "Positive");
    }
}
