// src/news/mod.rs
pub mod google_rss;

use anyhow::Result;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::report::Article;

pub use crate::news::google_rss::GoogleNewsRss;

/// Upper bound on normalized text length, in chars.
pub const MAX_TEXT_CHARS: usize = 1500;

/// Where articles about a company come from.
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    /// Latest articles for `company`; may be empty. Errors propagate to the caller.
    async fn fetch_news(&self, company: &str) -> Result<Vec<Article>>;
    fn name(&self) -> &'static str;
}

/// Normalize feed text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Entities that were double-escaped in the feed
    out = html_escape::decode_html_entities(&out).to_string();

    // 4) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 5) Collapse whitespace (incl. nbsp)
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"[\s\u{00A0}]+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 6) Length cap
    if out.chars().count() > MAX_TEXT_CHARS {
        out = out.chars().take(MAX_TEXT_CHARS).collect();
    }

    out
}
