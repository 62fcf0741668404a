//! Reduces a free-form model reply to an [`AnalysisResult`].
//!
//! The model is asked for JSON but cannot be held to a response schema while
//! the search tool is enabled, so the reply may carry code fences, prose
//! around the object, or missing fields. Extraction is lenient and every
//! field is defaulted explicitly.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    errors::ParseError,
    models::{AnalysisResult, Verdict},
};

/// Title used when the model omits one.
pub const DEFAULT_TITLE: &str = "বিশ্লেষণ সম্পন্ন";
/// Reason used when the model omits one.
pub const DEFAULT_REASON: &str = "বিস্তারিত তথ্য পাওয়া যায়নি।";

/// One citation record from the grounding metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl GroundingChunk {
    /// Convenience constructor for a chunk carrying a web URI.
    pub fn web(uri: impl Into<String>) -> Self {
        Self {
            web: Some(WebSource {
                uri: Some(uri.into()),
                title: None,
            }),
        }
    }
}

/// Upstream verdict object with every field optional.
///
/// `None` means absent or of an unusable type; defaulting happens in
/// [`PartialVerdict::into_result`] only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialVerdict {
    pub verdict: Option<Verdict>,
    pub title: Option<String>,
    pub reason: Option<String>,
    pub confidence_score: Option<f64>,
}

impl PartialVerdict {
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            verdict: object
                .get("verdict")
                .and_then(Value::as_str)
                .and_then(Verdict::parse_label),
            title: text("title"),
            reason: text("reason"),
            confidence_score: object.get("confidenceScore").and_then(score_value),
        }
    }

    pub fn into_result(self, grounding_urls: Vec<String>) -> AnalysisResult {
        AnalysisResult {
            verdict: self.verdict.unwrap_or_default(),
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            reason: self.reason.unwrap_or_else(|| DEFAULT_REASON.to_string()),
            confidence_score: self.confidence_score.map_or(0, clamp_score),
            grounding_urls,
        }
    }
}

/// Accepts numbers and numeric strings such as `"85"` or `"85%"`.
fn score_value(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    score.filter(|score| score.is_finite())
}

fn clamp_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

/// Locates the candidate JSON object between the first `{` and the last `}`.
fn extract_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Collects non-empty citation URIs, dropping duplicates.
pub fn collect_grounding_urls(chunks: &[GroundingChunk]) -> Vec<String> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref()?.uri.as_deref())
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .filter(|uri| seen.insert(*uri))
        .map(str::to_string)
        .collect()
}

/// Normalizes raw reply text plus grounding chunks into a result.
///
/// # Errors
///
/// - [`ParseError::EmptyResponse`] for empty text
/// - [`ParseError::InvalidStructure`] when no `{...}` span exists
/// - [`ParseError::MalformedJson`] when the span does not parse
pub fn normalize(
    raw_response_text: &str,
    grounding_chunks: &[GroundingChunk],
) -> Result<AnalysisResult, ParseError> {
    if raw_response_text.trim().is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let unfenced = raw_response_text.replace("```json", "").replace("```", "");
    let candidate = extract_object_span(&unfenced).ok_or(ParseError::InvalidStructure)?;

    let parsed: Value = serde_json::from_str(candidate).map_err(ParseError::MalformedJson)?;
    let partial = match &parsed {
        Value::Object(object) => PartialVerdict::from_object(object),
        _ => PartialVerdict::default(),
    };

    Ok(partial.into_result(collect_grounding_urls(grounding_chunks)))
}
