//! One-off report for a company, printed as JSON (no HTTP server).
//!
//! Usage: `cargo run --bin report_demo -- "Tesla"`

use company_news_sentiment::{api::AppState, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let company = std::env::args().nth(1).unwrap_or_else(|| "tesla".to_string());

    let cfg = AppConfig::load_default()?;
    let state = AppState::from_config(&cfg)?;
    let source = state.source.clone();
    let fetch_for = company.clone();

    let report = state
        .cache
        .get_or_build(&company, move || async move { source.fetch_news(&fetch_for).await })
        .await?;

    println!("{}", serde_json::to_string_pretty(report.as_ref())?);
    Ok(())
}
