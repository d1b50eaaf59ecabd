//! VADER compound scoring via the `vader_sentiment` crate.

use std::panic::{self, AssertUnwindSafe};

use vader_sentiment::SentimentIntensityAnalyzer;

use super::{AnalysisError, PolarityScorer};

/// Thread-safe wrapper around VADER's analyzer.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for VaderScorer {
    fn compound(&self, text: &str) -> Result<f64, AnalysisError> {
        if text.trim().is_empty() {
            return Ok(0.0);
        }

        // The lexicon walker indexes around tokens and can panic on odd input.
        let scores = panic::catch_unwind(AssertUnwindSafe(|| self.analyzer.polarity_scores(text)))
            .map_err(|payload| AnalysisError::Scoring(panic_message(payload.as_ref())))?;

        scores
            .get("compound")
            .copied()
            .ok_or_else(|| AnalysisError::Scoring("no compound score".into()))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "scorer panicked".to_string()
    }
}
