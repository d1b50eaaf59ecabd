// src/news/google_rss.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::NewsConfig;
use crate::news::{normalize_text, ArticleSource};
use crate::report::Article;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    description: Option<String>,
}

/// Parse an RSS document into at most `max_articles` articles, in feed order.
///
/// The summary is the item's description as plain text, or the title when
/// the description is empty. Items without a title are skipped.
pub fn parse_feed(xml: &str, max_articles: usize) -> Result<Vec<Article>> {
    let rss: Rss = from_str(xml).context("parsing news rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len().min(max_articles));
    for it in rss.channel.item {
        if out.len() >= max_articles {
            break;
        }
        let title = normalize_text(it.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            continue;
        }
        let mut summary = normalize_text(it.description.as_deref().unwrap_or_default());
        if summary.is_empty() {
            summary = title.clone();
        }
        out.push(Article { title, summary });
    }
    Ok(out)
}

/// Google News search feed for a company name.
pub struct GoogleNewsRss {
    http: reqwest::Client,
    feed_url: String,
    language: String,
    region: String,
    edition: String,
    max_articles: usize,
}

impl GoogleNewsRss {
    pub fn new(http: reqwest::Client, cfg: &NewsConfig) -> Self {
        Self {
            http,
            feed_url: cfg.feed_url.clone(),
            language: cfg.language.clone(),
            region: cfg.region.clone(),
            edition: cfg.edition.clone(),
            max_articles: cfg.max_articles,
        }
    }

    async fn fetch_inner(&self, company: &str) -> Result<Vec<Article>> {
        let resp = self
            .http
            .get(&self.feed_url)
            .query(&[
                ("q", company),
                ("hl", self.language.as_str()),
                ("gl", self.region.as_str()),
                ("ceid", self.edition.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("requesting news feed for '{company}'"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("news feed returned HTTP {status} for '{company}'");
        }

        let body = resp.text().await.context("reading news feed body")?;
        parse_feed(&body, self.max_articles)
    }
}

#[async_trait]
impl ArticleSource for GoogleNewsRss {
    async fn fetch_news(&self, company: &str) -> Result<Vec<Article>> {
        let t0 = std::time::Instant::now();
        counter!("news_fetch_total").increment(1);

        let res = self.fetch_inner(company).await;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("news_fetch_ms").record(ms);
        match &res {
            Ok(articles) => {
                info!(target: "news", %company, articles = articles.len(), fetch_ms = ms, "news fetched")
            }
            Err(e) => {
                warn!(target: "news", %company, error = ?e, "news fetch failed");
                counter!("news_fetch_errors_total").increment(1);
            }
        }
        res
    }

    fn name(&self) -> &'static str {
        "google-news-rss"
    }
}
