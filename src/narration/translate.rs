// src/narration/translate.rs
use async_trait::async_trait;
use serde_json::Value;

use super::{ServiceError, Translator};
use crate::config::TranslateConfig;

/// Google Translate via the public `client=gtx` endpoint.
pub struct GoogleTranslator {
    http: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(http: reqwest::Client, cfg: &TranslateConfig) -> Self {
        Self {
            http,
            endpoint: cfg.endpoint.clone(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ServiceError> {
        if text.trim().is_empty() || source.eq_ignore_ascii_case(target) {
            return Ok(text.to_string());
        }

        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        let body: Value = resp.json().await?;
        parse_gtx_response(&body)
    }
}

/// Join the translated segments of a gtx reply: `[[["seg", "orig", ...], ...], ...]`.
pub fn parse_gtx_response(body: &Value) -> Result<String, ServiceError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::Malformed("missing segment list".into()))?;

    let out: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();

    if out.is_empty() {
        return Err(ServiceError::Malformed("no translated segments".into()));
    }
    Ok(out)
}
