// src/analysis/mod.rs
//! Text analysis service: one piece of text in, a sentiment label and a few
//! keyphrases out.
//!
//! The scoring and extraction backends sit behind small traits so the service
//! can be built once at startup and swapped for a fake in tests. Failures are
//! returned as `AnalysisError`; the report aggregator decides the fallback.

pub mod keywords;
pub mod vader;

use std::sync::Arc;

use thiserror::Error;

use crate::report::SentimentLabel;

pub use crate::analysis::keywords::RakeExtractor;
pub use crate::analysis::vader::VaderScorer;

/// Compound score at or above which text is `Positive`.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound score at or below which text is `Negative`.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;
/// Keyphrases returned per text unless the caller asks otherwise.
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("sentiment scoring failed: {0}")]
    Scoring(String),

    #[error("compound score out of range: {0}")]
    InvalidScore(f64),

    #[error("keyword extraction failed: {0}")]
    Extraction(String),

    #[error("input too long: {len} chars (max {max})")]
    InputTooLong { len: usize, max: usize },
}

/// Text Analysis Service seam used by the aggregator.
pub trait TextAnalysis: Send + Sync {
    fn classify(&self, text: &str) -> Result<SentimentLabel, AnalysisError>;

    /// At most `top_n` keyphrases, most relevant first.
    fn extract_topics(&self, text: &str, top_n: usize) -> Result<Vec<String>, AnalysisError>;
}

/// Produces a compound polarity score in `[-1, 1]`.
pub trait PolarityScorer: Send + Sync {
    fn compound(&self, text: &str) -> Result<f64, AnalysisError>;
}

/// Produces ranked keyphrases for a text.
pub trait KeywordExtractor: Send + Sync {
    fn extract(&self, text: &str, top_n: usize) -> Result<Vec<String>, AnalysisError>;
}

/// Fixed threshold policy mapping a compound score to a label.
pub fn label_for_compound(score: f64) -> Result<SentimentLabel, AnalysisError> {
    if !score.is_finite() || !(-1.0..=1.0).contains(&score) {
        return Err(AnalysisError::InvalidScore(score));
    }
    let label = if score >= POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if score <= NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };
    Ok(label)
}

/// Concrete service: one scorer plus one extractor.
#[derive(Clone)]
pub struct TextAnalyzer {
    scorer: Arc<dyn PolarityScorer>,
    extractor: Arc<dyn KeywordExtractor>,
}

impl TextAnalyzer {
    pub fn new(scorer: Arc<dyn PolarityScorer>, extractor: Arc<dyn KeywordExtractor>) -> Self {
        Self { scorer, extractor }
    }
}

impl Default for TextAnalyzer {
    /// VADER compound scoring with RAKE-style keyphrases.
    fn default() -> Self {
        Self::new(Arc::new(VaderScorer::new()), Arc::new(RakeExtractor::new()))
    }
}

impl TextAnalysis for TextAnalyzer {
    fn classify(&self, text: &str) -> Result<SentimentLabel, AnalysisError> {
        let score = self.scorer.compound(text)?;
        label_for_compound(score)
    }

    fn extract_topics(&self, text: &str, top_n: usize) -> Result<Vec<String>, AnalysisError> {
        self.extractor.extract(text, top_n)
    }
}
