use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::analysis::TextAnalyzer;
use crate::cache::{normalize_company, ReportCache};
use crate::config::{build_http_client, AppConfig};
use crate::metrics::Metrics;
use crate::narration::{
    AudioNarration, GoogleTranslator, GoogleTts, Narrator, DEFAULT_SOURCE_LANG,
    DEFAULT_TARGET_LANG,
};
use crate::news::{ArticleSource, GoogleNewsRss};
use crate::report::{Report, ReportAggregator};

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ReportCache>,
    pub source: Arc<dyn ArticleSource>,
    pub narrator: Arc<Narrator>,
}

impl AppState {
    pub fn new(cache: ReportCache, source: Arc<dyn ArticleSource>, narrator: Narrator) -> Self {
        Self {
            cache: Arc::new(cache),
            source,
            narrator: Arc::new(narrator),
        }
    }

    /// Production wiring: Google News feed, VADER + keyphrase analysis,
    /// Google translate/TTS, all sharing one HTTP client.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let http = build_http_client(&cfg.http)?;

        let aggregator = ReportAggregator::new(Arc::new(TextAnalyzer::default()))
            .with_top_n(cfg.analysis.topics_per_article);
        let cache = ReportCache::new(aggregator, cfg.cache.capacity);

        let source = Arc::new(GoogleNewsRss::new(http.clone(), &cfg.news));
        let narrator = Narrator::new(
            Arc::new(GoogleTranslator::new(http.clone(), &cfg.translate)),
            Arc::new(GoogleTts::new(http, &cfg.speech)),
        );

        info!(
            source = source.name(),
            max_articles = cfg.news.max_articles,
            cache_capacity = ?cfg.cache.capacity,
            topics_per_article = cfg.analysis.topics_per_article,
            "app state ready"
        );

        Ok(Self::new(cache, source, narrator))
    }
}

pub fn router(state: AppState) -> Router {
    let metrics = Metrics::global();

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/news", get(get_company_news))
        .route("/audio", get(generate_audio))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
        .merge(metrics.router())
}

/// Uniform failure for the outer boundary: 500 with `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0:#}")]
    Upstream(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": detail })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub company: String,
}

async fn get_company_news(
    State(state): State<AppState>,
    Query(q): Query<NewsQuery>,
) -> Result<Json<Report>, ApiError> {
    let company = normalize_company(&q.company);
    let source = Arc::clone(&state.source);
    let fetch_for = company.clone();

    let report = state
        .cache
        .get_or_build(&company, move || async move { source.fetch_news(&fetch_for).await })
        .await
        .map_err(|e| {
            error!(company = %q.company, error = ?e, "news report failed");
            ApiError::from(e)
        })?;

    Ok(Json(report.as_ref().clone()))
}

#[derive(Debug, Deserialize)]
pub struct AudioQuery {
    pub text: String,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

fn default_source_lang() -> String {
    DEFAULT_SOURCE_LANG.to_string()
}

fn default_target_lang() -> String {
    DEFAULT_TARGET_LANG.to_string()
}

async fn generate_audio(
    State(state): State<AppState>,
    Query(q): Query<AudioQuery>,
) -> Json<AudioNarration> {
    let out = state
        .narrator
        .narrate(&q.text, &q.source_lang, &q.target_lang)
        .await;
    Json(out)
}
