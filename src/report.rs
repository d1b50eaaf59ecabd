//! # Report Aggregator
//! Turns a company's raw articles into one sentiment report.
//!
//! Each article's summary is classified and mined for topics through the
//! `TextAnalysis` service. Analysis errors never escape: a failed
//! classification counts as `Neutral` and failed extraction yields no topics,
//! for that article only.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::{TextAnalysis, DEFAULT_TOP_N};

/// Raw article as fetched from the news source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Iteration order used for tie-breaking the dominant label.
    pub const CANONICAL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Article plus its analysis. Serialized flat: `{title, summary, sentiment, topics}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedArticle {
    pub title: String,
    pub summary: String,
    pub sentiment: SentimentLabel,
    pub topics: Vec<String>,
}

/// Per-label article counts. All three keys are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    #[serde(rename = "Positive")]
    pub positive: u32,
    #[serde(rename = "Negative")]
    pub negative: u32,
    #[serde(rename = "Neutral")]
    pub neutral: u32,
}

impl SentimentDistribution {
    pub fn count(&self, label: SentimentLabel) -> u32 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    pub fn record(&mut self, label: SentimentLabel) {
        let slot = match label {
            SentimentLabel::Positive => &mut self.positive,
            SentimentLabel::Negative => &mut self.negative,
            SentimentLabel::Neutral => &mut self.neutral,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u32 {
        self.positive + self.negative + self.neutral
    }

    /// Label with the highest count; the first maximum in `CANONICAL` order wins.
    pub fn dominant(&self) -> SentimentLabel {
        let mut best = SentimentLabel::CANONICAL[0];
        for label in SentimentLabel::CANONICAL.into_iter().skip(1) {
            if self.count(label) > self.count(best) {
                best = label;
            }
        }
        best
    }

    /// Share of `label` in percent. Zero when there are no articles.
    pub fn percent(&self, label: SentimentLabel) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(label) as f64 / total as f64 * 100.0
    }
}

/// Aggregated sentiment report for one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub company: String,
    pub articles: Vec<AnalyzedArticle>,
    pub sentiment_distribution: SentimentDistribution,
    pub sentiment_summary: String,
}

impl Report {
    /// Report for a company with no articles.
    pub fn empty(company: &str) -> Self {
        Self {
            company: company.to_string(),
            articles: Vec::new(),
            sentiment_distribution: SentimentDistribution::default(),
            sentiment_summary: format!("No news found for {company}"),
        }
    }
}

/// Narrative line for a non-empty distribution. Percentages are rounded
/// independently to one decimal and may not add up to exactly 100.0.
pub fn sentiment_summary(company: &str, distribution: &SentimentDistribution) -> String {
    format!(
        "{company}'s recent news coverage is predominantly {dominant}. \
         Sentiment Breakdown: Positive: {p:.1}%, Neutral: {n:.1}%, Negative: {g:.1}%",
        dominant = distribution.dominant(),
        p = distribution.percent(SentimentLabel::Positive),
        n = distribution.percent(SentimentLabel::Neutral),
        g = distribution.percent(SentimentLabel::Negative),
    )
}

/// Builds reports with a shared analysis service.
#[derive(Clone)]
pub struct ReportAggregator {
    analysis: Arc<dyn TextAnalysis>,
    top_n: usize,
}

impl ReportAggregator {
    pub fn new(analysis: Arc<dyn TextAnalysis>) -> Self {
        Self {
            analysis,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Topics kept per article (default 5).
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn build_report(&self, company: &str, articles: Vec<Article>) -> Report {
        if articles.is_empty() {
            debug!(target: "report", %company, "no articles; empty report");
            return Report::empty(company);
        }

        let t0 = Instant::now();
        let mut distribution = SentimentDistribution::default();
        let mut analyzed = Vec::with_capacity(articles.len());

        for (idx, article) in articles.into_iter().enumerate() {
            let sentiment = self.sentiment_or_neutral(idx, &article.summary);
            let topics = self.topics_or_empty(idx, &article.summary);

            distribution.record(sentiment);
            analyzed.push(AnalyzedArticle {
                title: article.title,
                summary: article.summary,
                sentiment,
                topics,
            });
        }

        let summary = sentiment_summary(company, &distribution);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("report_build_ms").record(ms);
        debug!(
            target: "report",
            %company,
            articles = analyzed.len(),
            positive = distribution.positive,
            negative = distribution.negative,
            neutral = distribution.neutral,
            build_ms = ms,
            "report built"
        );

        Report {
            company: company.to_string(),
            articles: analyzed,
            sentiment_distribution: distribution,
            sentiment_summary: summary,
        }
    }

    fn sentiment_or_neutral(&self, idx: usize, text: &str) -> SentimentLabel {
        match self.analysis.classify(text) {
            Ok(label) => label,
            Err(e) => {
                warn!(target: "report", article = idx, error = %e, "classification failed; using Neutral");
                counter!("analysis_fallbacks_total", "kind" => "sentiment").increment(1);
                SentimentLabel::Neutral
            }
        }
    }

    fn topics_or_empty(&self, idx: usize, text: &str) -> Vec<String> {
        match self.analysis.extract_topics(text, self.top_n) {
            Ok(mut topics) => {
                topics.truncate(self.top_n);
                topics
            }
            Err(e) => {
                warn!(target: "report", article = idx, error = %e, "topic extraction failed; using none");
                counter!("analysis_fallbacks_total", "kind" => "topics").increment(1);
                Vec::new()
            }
        }
    }
}
