// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod metrics;
pub mod narration;
pub mod news;
pub mod report;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::cache::{normalize_company, ReportCache};
pub use crate::report::{Article, Report, ReportAggregator, SentimentLabel};
