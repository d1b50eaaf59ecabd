// src/narration/speech.rs
use async_trait::async_trait;

use super::{ServiceError, SpeechSynthesizer};
use crate::config::SpeechConfig;

/// Google Translate text-to-speech. Long text is spoken chunk by chunk and the
/// MP3 frames are concatenated.
pub struct GoogleTts {
    http: reqwest::Client,
    endpoint: String,
    chunk_chars: usize,
}

impl GoogleTts {
    pub fn new(http: reqwest::Client, cfg: &SpeechConfig) -> Self {
        Self {
            http,
            endpoint: cfg.endpoint.clone(),
            chunk_chars: cfg.chunk_chars.max(1),
        }
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, ServiceError> {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language),
                ("q", chunk),
                ("idx", idx.as_str()),
                ("total", total.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, ServiceError> {
        let chunks = split_chunks(text, self.chunk_chars);
        if chunks.is_empty() {
            return Err(ServiceError::EmptyInput);
        }

        let total = chunks.len();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let mut part = self.fetch_chunk(chunk, language, idx, total).await?;
            if part.is_empty() {
                return Err(ServiceError::Malformed(format!("empty audio for chunk {idx}")));
            }
            audio.append(&mut part);
        }
        Ok(audio)
    }
}

/// Split on whitespace into chunks of at most `max_chars` chars. A single word
/// longer than the limit is hard-split.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
