use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::warn;

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Process-wide Prometheus recorder, installed on first use.
    ///
    /// If another recorder already owns the global slot, the handle renders an
    /// unattached recorder (empty exposition) instead of failing.
    pub fn global() -> Self {
        static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();
        let handle = HANDLE
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(h) => {
                    describe_all();
                    h
                }
                Err(e) => {
                    warn!(error = %e, "prometheus recorder not installed");
                    PrometheusBuilder::new().build_recorder().handle()
                }
            })
            .clone();
        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe_all() {
    describe_counter!("news_cache_hits_total", "Report lookups served from cache.");
    describe_counter!(
        "news_cache_misses_total",
        "Report lookups that fetched and built a report."
    );
    describe_counter!(
        "news_cache_evictions_total",
        "Reports evicted by the cache capacity bound."
    );
    describe_gauge!("news_cache_entries", "Companies currently held by the cache.");
    describe_counter!("news_fetch_total", "News feed fetches attempted.");
    describe_counter!("news_fetch_errors_total", "News feed fetch/parse errors.");
    describe_histogram!("news_fetch_ms", "News feed fetch time in milliseconds.");
    describe_histogram!("report_build_ms", "Report aggregation time in milliseconds.");
    describe_counter!(
        "analysis_fallbacks_total",
        "Per-article analysis failures replaced by fallback values."
    );
    describe_counter!(
        "narration_fallbacks_total",
        "Translation/speech failures replaced by fallback values."
    );
}
