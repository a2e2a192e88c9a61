//! Optional translation of APOD explanations.
//!
//! Translation never fails a request: on error the caller keeps the
//! original text.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

const GOOGLE_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";
const TRANSLATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the translation backend.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translation service returned HTTP {0}")]
    Status(u16),

    #[error("unexpected translation payload: {0}")]
    Payload(String),
}

/// Translates free text into a fixed target language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, TranslationError>;
}

/// Translates `text`, falling back to it unchanged on any failure.
pub async fn translate_or_original(translator: Option<&dyn Translator>, text: &str) -> String {
    let Some(translator) = translator else {
        return text.to_owned();
    };

    match translator.translate(text).await {
        Ok(translated) if !translated.trim().is_empty() => translated,
        Ok(_) => {
            warn!("Translation came back empty, using original text");
            text.to_owned()
        }
        Err(e) => {
            warn!("Translation failed, using original text: {}", e);
            text.to_owned()
        }
    }
}

/// Client for the public Google Translate endpoint (`client=gtx`).
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    http: reqwest::Client,
    target: String,
    url: String,
}

impl GoogleTranslator {
    #[must_use]
    pub fn new(http: reqwest::Client, target: impl Into<String>) -> Self {
        Self {
            http,
            target: target.into(),
            url: GOOGLE_TRANSLATE_URL.to_owned(),
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        debug!("Translating {} chars to {}", text.chars().count(), self.target);

        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .timeout(TRANSLATE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status(status.as_u16()));
        }

        let payload: serde_json::Value = response.json().await?;
        join_segments(&payload)
    }
}

/// The response is `[[["translated", "source", ...], ...], ...]`; the
/// translation is the concatenation of each segment's first element.
fn join_segments(payload: &serde_json::Value) -> Result<String, TranslationError> {
    let segments = payload
        .get(0)
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| TranslationError::Payload("missing segment list".to_owned()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(serde_json::Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(TranslationError::Payload("no translated segments".to_owned()));
    }
    Ok(translated)
}
