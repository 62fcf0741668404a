//! Data models for analysis requests, results, and shared handler state.
//!
//! Result types serialize in camelCase so the browser UI can consume them
//! without a mapping layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    config::AppConfig,
    detection::{GeminiClient, GenerativeModel, RequestComposer, wrap_link},
    services::AnalysisService,
};

/// Closed set of verdict labels produced for a piece of submitted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Real,
    Fake,
    AiGenerated,
    #[default]
    Unsure,
    Misleading,
}

impl Verdict {
    /// Parses an upstream label, tolerating case and `-`/space separators.
    ///
    /// Returns `None` for anything outside the closed set.
    pub fn parse_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "REAL" => Some(Verdict::Real),
            "FAKE" => Some(Verdict::Fake),
            "AI_GENERATED" => Some(Verdict::AiGenerated),
            "UNSURE" => Some(Verdict::Unsure),
            "MISLEADING" => Some(Verdict::Misleading),
            _ => None,
        }
    }
}

/// The normalized outcome of one analysis call.
///
/// Constructed once per successful call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub verdict: Verdict,
    /// Short human-readable headline
    pub title: String,
    /// Short rationale
    pub reason: String,
    /// Confidence in [0, 100]
    pub confidence_score: u8,
    /// Deduplicated citation URLs, first-seen order
    pub grounding_urls: Vec<String>,
}

/// The three mutually exclusive input modes of the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Text,
    Link,
    Image,
}

/// Request body of `POST /api/analyze`.
///
/// # Examples
///
/// ```json
/// { "mode": "link", "text": "https://example.com/viral-post" }
/// { "mode": "image", "image": "data:image/png;base64,iVBORw0KGgo..." }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AnalyzeRequest {
    /// Input mode, defaults to `text`
    #[serde(default)]
    pub mode: InputMode,
    /// Free text, a URL in link mode, or an optional caption in image mode
    #[validate(length(max = 20000, message = "Text must be at most 20000 characters"))]
    pub text: Option<String>,
    /// Data-URL encoded image
    pub image: Option<String>,
}

impl AnalyzeRequest {
    /// Text to forward upstream, with link inputs wrapped in the verification prompt.
    pub fn prompt_text(&self) -> Option<String> {
        let text = self.text.as_deref().filter(|t| !t.trim().is_empty())?;
        match self.mode {
            InputMode::Link => Some(wrap_link(text.trim())),
            InputMode::Text | InputMode::Image => Some(text.to_string()),
        }
    }

    /// Image payload, honoured only in image mode.
    pub fn image_data_url(&self) -> Option<&str> {
        match self.mode {
            InputMode::Image => self.image.as_deref(),
            InputMode::Text | InputMode::Link => None,
        }
    }
}

/// Shared application state for all handlers.
///
/// Generic over the model client so tests can inject a fake.
pub struct AppState<M = GeminiClient> {
    /// Orchestrates compose, upstream call and normalization
    pub analyzer: Arc<AnalysisService<M>>,
    /// Immutable process configuration
    pub config: Arc<AppConfig>,
}

impl<M> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            analyzer: Arc::clone(&self.analyzer),
            config: Arc::clone(&self.config),
        }
    }
}

impl<M: GenerativeModel> AppState<M> {
    /// Wires the analysis service around an already constructed model client.
    pub fn with_model(config: AppConfig, model: M) -> Self {
        let composer = RequestComposer::new(config.system_instruction.clone());
        Self {
            analyzer: Arc::new(AnalysisService::new(composer, model)),
            config: Arc::new(config),
        }
    }
}

impl AppState<GeminiClient> {
    /// Creates the production state with a Gemini client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let model = GeminiClient::new(&config)?;
        Ok(Self::with_model(config, model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_labels_serialize_in_upper_snake_case() {
        assert_eq!(
            serde_json::to_string(&Verdict::AiGenerated).unwrap(),
            "\"AI_GENERATED\""
        );
        assert_eq!(Verdict::parse_label("ai-generated"), Some(Verdict::AiGenerated));
        assert_eq!(Verdict::parse_label(" Misleading "), Some(Verdict::Misleading));
        assert_eq!(Verdict::parse_label("PROBABLY_FAKE"), None);
    }

    #[test]
    fn result_uses_camel_case_fields() {
        let result = AnalysisResult {
            verdict: Verdict::Real,
            title: "T".into(),
            reason: "R".into(),
            confidence_score: 90,
            grounding_urls: vec!["https://a.com".into()],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["confidenceScore"], 90);
        assert_eq!(value["groundingUrls"][0], "https://a.com");
        assert_eq!(value["verdict"], "REAL");
    }

    #[test]
    fn link_mode_wraps_text() {
        let req = AnalyzeRequest {
            mode: InputMode::Link,
            text: Some(" https://example.com/news ".into()),
            image: None,
        };
        assert_eq!(
            req.prompt_text().as_deref(),
            Some("লিংকটি যাচাই করুন: https://example.com/news")
        );
    }

    #[test]
    fn image_ignored_outside_image_mode() {
        let req = AnalyzeRequest {
            mode: InputMode::Text,
            text: Some("hello".into()),
            image: Some("data:image/png;base64,AAAA".into()),
        };
        assert!(req.image_data_url().is_none());
        assert_eq!(req.prompt_text().as_deref(), Some("hello"));
    }

    #[test]
    fn blank_text_is_absent() {
        let req = AnalyzeRequest {
            text: Some("   ".into()),
            ..Default::default()
        };
        assert!(req.prompt_text().is_none());
    }

    #[test]
    fn overlong_text_fails_validation() {
        let req = AnalyzeRequest {
            text: Some("x".repeat(20001)),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
