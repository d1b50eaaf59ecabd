// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, with fake
// collaborators standing in for the news feed, translator and TTS.
//
// Covered:
// - GET /health
// - GET /news   (shape, caching across casing, empty result, upstream failure)
// - GET /audio  (defaults, translation + synthesis fallbacks)
// - GET /metrics

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use company_news_sentiment::analysis::{AnalysisError, TextAnalysis};
use company_news_sentiment::api::{self, AppState};
use company_news_sentiment::narration::{Narrator, ServiceError, SpeechSynthesizer, Translator};
use company_news_sentiment::news::ArticleSource;
use company_news_sentiment::{Article, ReportAggregator, ReportCache, SentimentLabel};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Serves canned articles; "nobody" has none, "broken" fails.
#[derive(Default)]
struct FakeSource {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl ArticleSource for FakeSource {
    async fn fetch_news(&self, company: &str) -> anyhow::Result<Vec<Article>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match company {
            "broken" => Err(anyhow!("feed unreachable")),
            "nobody" => Ok(Vec::new()),
            _ => Ok(vec![
                Article {
                    title: format!("{company} beats estimates"),
                    summary: "great quarter for the company".into(),
                },
                Article {
                    title: format!("{company} faces recall"),
                    summary: "bad news on safety".into(),
                },
                Article {
                    title: format!("{company} hosts event"),
                    summary: "great turnout".into(),
                },
                Article {
                    title: format!("{company} files report"),
                    summary: "routine filing".into(),
                },
            ]),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

struct WordFake;

impl TextAnalysis for WordFake {
    fn classify(&self, text: &str) -> Result<SentimentLabel, AnalysisError> {
        Ok(if text.contains("great") {
            SentimentLabel::Positive
        } else if text.contains("bad") {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        })
    }

    fn extract_topics(&self, text: &str, top_n: usize) -> Result<Vec<String>, AnalysisError> {
        Ok(text
            .split_whitespace()
            .take(top_n)
            .map(str::to_string)
            .collect())
    }
}

/// "Translates" by tagging the text; fails when asked for "xx".
struct TagTranslator;

#[async_trait::async_trait]
impl Translator for TagTranslator {
    async fn translate(&self, text: &str, _s: &str, target: &str) -> Result<String, ServiceError> {
        if target == "xx" {
            return Err(ServiceError::Status(429));
        }
        Ok(format!("[{target}] {text}"))
    }
}

/// Returns the language code as audio bytes; fails for "mute".
struct EchoSpeech;

#[async_trait::async_trait]
impl SpeechSynthesizer for EchoSpeech {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, ServiceError> {
        if text.contains("mute") {
            return Err(ServiceError::EmptyInput);
        }
        Ok(language.as_bytes().to_vec())
    }
}

fn test_router(source: Arc<FakeSource>) -> Router {
    let cache = ReportCache::unbounded(ReportAggregator::new(Arc::new(WordFake)));
    let narrator = Narrator::new(Arc::new(TagTranslator), Arc::new(EchoSpeech));
    api::router(AppState::new(cache, source, narrator))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Json) {
    let (status, bytes) = get(app, uri).await;
    let v: Json = serde_json::from_slice(&bytes).expect("parse json");
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router(Arc::default());
    let (status, bytes) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK, "health should be 200");
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "OK");
}

#[tokio::test]
async fn api_news_returns_report_shape() {
    let app = test_router(Arc::default());
    let (status, v) = get_json(&app, "/news?company=Acme").await;
    assert_eq!(status, StatusCode::OK);

    // Contract checks for UI consumers
    assert_eq!(v["company"], "acme");
    let arts = v["articles"].as_array().expect("articles array");
    assert_eq!(arts.len(), 4);
    for a in arts {
        for key in ["title", "summary", "sentiment", "topics"] {
            assert!(a.get(key).is_some(), "article missing '{key}'");
        }
    }
    assert_eq!(arts[0]["title"], "acme beats estimates");
    assert_eq!(arts[0]["sentiment"], "Positive");
    assert_eq!(arts[1]["sentiment"], "Negative");

    let dist = &v["sentiment_distribution"];
    assert_eq!(dist["Positive"], 2);
    assert_eq!(dist["Negative"], 1);
    assert_eq!(dist["Neutral"], 1);

    assert_eq!(
        v["sentiment_summary"],
        "acme's recent news coverage is predominantly Positive. \
         Sentiment Breakdown: Positive: 50.0%, Neutral: 25.0%, Negative: 25.0%"
    );
}

#[tokio::test]
async fn api_news_is_cached_across_casing_and_whitespace() {
    let source = Arc::new(FakeSource::default());
    let app = test_router(source.clone());

    let (s1, v1) = get_json(&app, "/news?company=Tesla").await;
    let (s2, v2) = get_json(&app, "/news?company=%20%20tesla%20").await;
    let (s3, v3) = get_json(&app, "/news?company=TESLA").await;

    assert_eq!((s1, s2, s3), (StatusCode::OK, StatusCode::OK, StatusCode::OK));
    assert_eq!(v1, v2);
    assert_eq!(v1, v3);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1, "feed hit once");
}

#[tokio::test]
async fn api_news_without_articles_reports_no_news() {
    let app = test_router(Arc::default());
    let (status, v) = get_json(&app, "/news?company=Nobody").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["articles"].as_array().map(Vec::len), Some(0));
    assert_eq!(v["sentiment_distribution"]["Positive"], 0);
    assert_eq!(v["sentiment_distribution"]["Negative"], 0);
    assert_eq!(v["sentiment_distribution"]["Neutral"], 0);
    assert_eq!(v["sentiment_summary"], "No news found for nobody");
}

#[tokio::test]
async fn api_news_upstream_failure_is_500_with_detail() {
    let source = Arc::new(FakeSource::default());
    let app = test_router(source.clone());

    let (status, v) = get_json(&app, "/news?company=broken").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        v["detail"].as_str().unwrap_or_default().contains("feed unreachable"),
        "detail should carry the error text, got {v}"
    );

    // failures are not cached
    let (status, _) = get_json(&app, "/news?company=broken").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn api_news_requires_company() {
    let app = test_router(Arc::default());
    let (status, _) = get(&app, "/news").await;
    assert!(status.is_client_error(), "got {status}");
}

#[tokio::test]
async fn api_audio_uses_default_languages() {
    let app = test_router(Arc::default());
    let (status, v) = get_json(&app, "/audio?text=Hello%20world").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(v["original_text"], "Hello world");
    assert_eq!(v["translated_text"], "[hi] Hello world");
    assert_eq!(v["source_language"], "en");
    assert_eq!(v["target_language"], "hi");
    // EchoSpeech returns the spoken language: base64("hi")
    assert_eq!(v["audio_base64"], "aGk=");
}

#[tokio::test]
async fn api_audio_translation_failure_keeps_text_and_speaks_source() {
    let app = test_router(Arc::default());
    let (status, v) = get_json(&app, "/audio?text=Hello&source_lang=en&target_lang=xx").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(v["translated_text"], "Hello");
    assert_eq!(v["target_language"], "xx");
    // base64("en")
    assert_eq!(v["audio_base64"], "ZW4=");
}

#[tokio::test]
async fn api_audio_synthesis_failure_returns_empty_audio() {
    let app = test_router(Arc::default());
    let (status, v) = get_json(&app, "/audio?text=mute%20please").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["translated_text"], "[hi] mute please");
    assert_eq!(v["audio_base64"], "");
}

#[tokio::test]
async fn api_metrics_endpoint_responds() {
    let app = test_router(Arc::default());
    let _ = get(&app, "/news?company=Initech").await;
    let (status, bytes) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(bytes).is_ok());
}
