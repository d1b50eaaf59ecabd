// src/narration/mod.rs
//! Translated audio narration of a piece of text.
//!
//! `Narrator::narrate` never fails: a failed translation keeps the original
//! text, a failed synthesis yields empty audio. Both are logged and counted,
//! and stay visible in the payload.

pub mod speech;
pub mod translate;

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use crate::narration::speech::GoogleTts;
pub use crate::narration::translate::GoogleTranslator;

pub const DEFAULT_SOURCE_LANG: &str = "en";
pub const DEFAULT_TARGET_LANG: &str = "hi";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("malformed upstream payload: {0}")]
    Malformed(String),

    #[error("nothing to process: empty text")]
    EmptyInput,
}

#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, ServiceError>;
}

#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Encoded audio (MP3) for `text` spoken in `language`.
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, ServiceError>;
}

/// `/audio` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioNarration {
    pub original_text: String,
    pub translated_text: String,
    pub audio_base64: String,
    pub source_language: String,
    pub target_language: String,
}

#[derive(Clone)]
pub struct Narrator {
    translator: Arc<dyn Translator>,
    speech: Arc<dyn SpeechSynthesizer>,
}

impl Narrator {
    pub fn new(translator: Arc<dyn Translator>, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { translator, speech }
    }

    pub async fn narrate(&self, text: &str, source_lang: &str, target_lang: &str) -> AudioNarration {
        let translated = self.translate_or_original(text, source_lang, target_lang).await;

        // Speak the target language only if translation actually happened.
        let speak_lang = if translated != text {
            target_lang
        } else {
            source_lang
        };
        let audio = self.synthesize_or_empty(&translated, speak_lang).await;

        debug!(
            target: "narration",
            source = source_lang,
            target = target_lang,
            spoken = speak_lang,
            audio_bytes = audio.len(),
            "narration ready"
        );

        AudioNarration {
            original_text: text.to_string(),
            translated_text: translated,
            audio_base64: if audio.is_empty() {
                String::new()
            } else {
                BASE64.encode(&audio)
            },
            source_language: source_lang.to_string(),
            target_language: target_lang.to_string(),
        }
    }

    async fn translate_or_original(&self, text: &str, source: &str, target: &str) -> String {
        match self.translator.translate(text, source, target).await {
            Ok(t) => t,
            Err(e) => {
                warn!(target: "narration", error = %e, source, target, "translation failed; keeping original text");
                counter!("narration_fallbacks_total", "stage" => "translate").increment(1);
                text.to_string()
            }
        }
    }

    async fn synthesize_or_empty(&self, text: &str, language: &str) -> Vec<u8> {
        match self.speech.synthesize(text, language).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(target: "narration", error = %e, language, "speech synthesis failed; no audio");
                counter!("narration_fallbacks_total", "stage" => "speech").increment(1);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Upper;

    #[async_trait::async_trait]
    impl Translator for Upper {
        async fn translate(&self, text: &str, _s: &str, _t: &str) -> Result<String, ServiceError> {
            Ok(text.to_uppercase())
        }
    }

    struct DownTranslator;

    #[async_trait::async_trait]
    impl Translator for DownTranslator {
        async fn translate(&self, _text: &str, _s: &str, _t: &str) -> Result<String, ServiceError> {
            Err(ServiceError::Status(503))
        }
    }

    /// Records the language it was asked to speak.
    #[derive(Default)]
    struct RecordingSpeech {
        langs: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl SpeechSynthesizer for RecordingSpeech {
        async fn synthesize(&self, _text: &str, language: &str) -> Result<Vec<u8>, ServiceError> {
            self.langs.lock().unwrap().push(language.to_string());
            if self.fail {
                return Err(ServiceError::Malformed("no audio".into()));
            }
            Ok(b"ID3fake".to_vec())
        }
    }

    #[tokio::test]
    async fn translated_text_is_spoken_in_target_language() {
        let speech = Arc::new(RecordingSpeech::default());
        let n = Narrator::new(Arc::new(Upper), speech.clone());
        let out = n.narrate("hello", "en", "hi").await;

        assert_eq!(out.original_text, "hello");
        assert_eq!(out.translated_text, "HELLO");
        assert_eq!(out.audio_base64, BASE64.encode(b"ID3fake"));
        assert_eq!(out.source_language, "en");
        assert_eq!(out.target_language, "hi");
        assert_eq!(speech.langs.lock().unwrap().as_slice(), ["hi"]);
    }

    #[tokio::test]
    async fn translation_failure_keeps_original_and_speaks_source_language() {
        let speech = Arc::new(RecordingSpeech::default());
        let n = Narrator::new(Arc::new(DownTranslator), speech.clone());
        let out = n.narrate("hello", "en", "hi").await;

        assert_eq!(out.translated_text, "hello");
        assert!(!out.audio_base64.is_empty());
        assert_eq!(speech.langs.lock().unwrap().as_slice(), ["en"]);
    }

    #[tokio::test]
    async fn synthesis_failure_yields_empty_audio() {
        let speech = Arc::new(RecordingSpeech {
            fail: true,
            ..Default::default()
        });
        let n = Narrator::new(Arc::new(Upper), speech);
        let out = n.narrate("hello", "en", "hi").await;

        assert_eq!(out.translated_text, "HELLO");
        assert_eq!(out.audio_base64, "");
    }
}
