// src/config/mod.rs
//! Application configuration.
//!
//! Resolution order:
//! 1) `$NEWS_CONFIG_PATH` (must exist when set)
//! 2) `config/app.toml`
//! 3) built-in defaults
//!
//! A few knobs can then be overridden from the environment (see `ENV_*`).

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::analysis::DEFAULT_TOP_N;

pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

pub const ENV_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";
pub const ENV_MAX_ARTICLES: &str = "NEWS_MAX_ARTICLES";
pub const ENV_CACHE_CAPACITY: &str = "NEWS_CACHE_CAPACITY";
pub const ENV_TOPICS_TOP_N: &str = "NEWS_TOPICS_TOP_N";

const DEFAULT_MAX_ARTICLES: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub news: NewsConfig,
    pub analysis: AnalysisConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
    pub translate: TranslateConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub feed_url: String,
    /// `hl` query parameter.
    pub language: String,
    /// `gl` query parameter.
    pub region: String,
    /// `ceid` query parameter.
    pub edition: String,
    pub max_articles: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://news.google.com/rss/search".to_string(),
            language: "en-US".to_string(),
            region: "US".to_string(),
            edition: "US:en".to_string(),
            max_articles: DEFAULT_MAX_ARTICLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub topics_per_article: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            topics_per_article: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Max companies kept; absent or 0 means unbounded.
    pub capacity: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("company-news-sentiment/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 4,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    pub endpoint: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub endpoint: String,
    /// Max chars per synthesis request.
    pub chunk_chars: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.google.com/translate_tts".to_string(),
            chunk_chars: 100,
        }
    }
}

impl AppConfig {
    /// Load from an explicit TOML file, then sanitize.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let mut cfg: AppConfig = toml::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Resolve file (env path, default path, or defaults) and apply env overrides.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from_file(&default_p)?
            } else {
                AppConfig::default()
            }
        };

        cfg.apply_env_overrides();
        cfg.sanitize();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(n) = parse_usize_env(ENV_MAX_ARTICLES) {
            self.news.max_articles = n;
        }
        if let Some(n) = parse_usize_env(ENV_TOPICS_TOP_N) {
            self.analysis.topics_per_article = n;
        }
        if let Ok(raw) = std::env::var(ENV_CACHE_CAPACITY) {
            let raw = raw.trim().to_ascii_lowercase();
            if raw == "none" || raw == "unbounded" {
                self.cache.capacity = None;
            } else if let Some(n) = parse_usize(ENV_CACHE_CAPACITY, &raw) {
                self.cache.capacity = Some(n);
            }
        }
    }

    fn sanitize(&mut self) {
        if self.news.max_articles == 0 {
            self.news.max_articles = DEFAULT_MAX_ARTICLES;
        }
        if self.cache.capacity == Some(0) {
            self.cache.capacity = None;
        }
        if self.speech.chunk_chars == 0 {
            self.speech.chunk_chars = SpeechConfig::default().chunk_chars;
        }
    }
}

fn parse_usize_env(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    parse_usize(name, &raw)
}

fn parse_usize(name: &str, raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(target: "config", var = name, value = raw, "ignoring non-numeric override");
            None
        }
    }
}

/// Shared HTTP client for the feed, translation and speech calls.
pub fn build_http_client(cfg: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .context("building http client")
}
