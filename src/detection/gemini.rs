//! Gemini `generateContent` REST client.
//!
//! Requests always carry the system instruction and the `googleSearch` tool.
//! No `responseSchema`/`responseMimeType` is set because the API rejects them
//! while the search tool is active.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::{ContentPart, GenerativeModel, GroundingChunk, ModelReply, RequestPayload};
use crate::{
    config::AppConfig,
    errors::{UpstreamError, UpstreamErrorKind, classify_description},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: SystemInstruction<'a>,
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    InlineData(InlineDataPart),
    Text(TextPart<'a>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPart {
    inline_data: InlineData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

impl<'a> GenerateContentRequest<'a> {
    fn from_payload(payload: &'a RequestPayload) -> Self {
        let parts = payload
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::InlineImage(image) => WirePart::InlineData(InlineDataPart {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.to_base64(),
                    },
                }),
                ContentPart::Text(text) => WirePart::Text(TextPart { text }),
            })
            .collect();

        let tools = if payload.web_search {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        Self {
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: &payload.system_instruction,
                }],
            },
            contents: vec![Content {
                role: "user",
                parts,
            }],
            tools,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    /// Set on thinking parts, which are not part of the answer
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated answer text and grounding chunks of the first candidate.
    fn into_reply(self) -> ModelReply {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return ModelReply::default();
        };

        let texts: Vec<String> = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|part| part.thought != Some(true))
            .filter_map(|part| part.text)
            .collect();

        ModelReply {
            text: (!texts.is_empty()).then(|| texts.concat()),
            grounding_chunks: candidate
                .grounding_metadata
                .map(|meta| meta.grounding_chunks)
                .unwrap_or_default(),
        }
    }
}

/// Builds a tagged [`UpstreamError`] from a non-success HTTP reply.
///
/// The Gemini error body is used when it parses; its `status` field and the
/// HTTP status take precedence over substring classification.
pub fn upstream_error(status: StatusCode, body: &str) -> UpstreamError {
    let api_error = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let message = api_error
        .as_ref()
        .map(|e| e.message.as_str())
        .filter(|m| !m.is_empty())
        .unwrap_or(body);
    let api_status = api_error.as_ref().and_then(|e| e.status.as_deref());
    let description = format!("[{status}] {message}");

    let kind = match (status.as_u16(), api_status) {
        (404, _) | (_, Some("NOT_FOUND")) => UpstreamErrorKind::NotFound,
        (401 | 403, _) | (_, Some("PERMISSION_DENIED" | "UNAUTHENTICATED")) => {
            UpstreamErrorKind::Unauthorized
        }
        (_, Some("INVALID_ARGUMENT")) if message.contains("API key") => {
            UpstreamErrorKind::Unauthorized
        }
        _ => classify_description(&description),
    };

    UpstreamError::new(kind, description)
}

/// Client for one configured Gemini model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Creates a client from the injected configuration.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.api_base, config.model
            ),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

impl GenerativeModel for GeminiClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model, parts = payload.parts.len()))]
    async fn generate<'a>(&'a self, payload: &'a RequestPayload) -> Result<ModelReply, UpstreamError> {
        let request = GenerateContentRequest::from_payload(payload);

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Gemini request failed");
                UpstreamError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, body_len = body.len(), "Gemini response received");

        if !status.is_success() {
            let err = upstream_error(status, &body);
            error!(status = %status, kind = ?err.kind, error = %err, "Gemini API error");
            return Err(err);
        }

        let decoded: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            UpstreamError::new(
                UpstreamErrorKind::Other,
                format!("failed to decode Gemini response: {e}"),
            )
        })?;

        if let Some(reason) = decoded
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            warn!(block_reason = reason, "Gemini blocked the prompt");
        }
        if let Some(reason) = decoded
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            debug!(finish_reason = reason, "Gemini candidate finished");
        }

        let reply = decoded.into_reply();
        info!(
            has_text = reply.text.is_some(),
            grounding_chunks = reply.grounding_chunks.len(),
            "Gemini generation completed"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::RequestComposer;

    #[test]
    fn request_places_image_first_and_enables_search() {
        let payload = RequestComposer::new("persona")
            .compose(Some("hi"), Some("data:image/png;base64,iVBORw0KGgo="))
            .unwrap();
        let json = serde_json::to_value(GenerateContentRequest::from_payload(&payload)).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "persona");
        assert_eq!(json["contents"][0]["role"], "user");
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "iVBORw0KGgo=");
        assert_eq!(parts[1]["text"], "hi");
        assert_eq!(json["tools"], serde_json::json!([{ "googleSearch": {} }]));
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn reply_concatenates_text_and_keeps_chunks() {
        let body = r#"{
            "candidates": [{
                "content": { "role": "model", "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "```json\n{\"verdict\":" },
                    { "text": "\"REAL\"}\n```" }
                ]},
                "finishReason": "STOP",
                "groundingMetadata": {
                    "webSearchQueries": ["q"],
                    "groundingChunks": [
                        { "web": { "uri": "https://a.com", "title": "a.com" } },
                        { "retrievedContext": {} }
                    ]
                }
            }]
        }"#;
        let reply = serde_json::from_str::<GenerateContentResponse>(body)
            .unwrap()
            .into_reply();
        assert_eq!(
            reply.text.as_deref(),
            Some("```json\n{\"verdict\":\"REAL\"}\n```")
        );
        assert_eq!(reply.grounding_chunks.len(), 2);
        assert_eq!(reply.grounding_chunks[0], GroundingChunk {
            web: Some(crate::detection::WebSource {
                uri: Some("https://a.com".into()),
                title: Some("a.com".into()),
            }),
        });
    }

    #[test]
    fn blocked_prompt_yields_no_text() {
        let body = r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#;
        let reply = serde_json::from_str::<GenerateContentResponse>(body)
            .unwrap()
            .into_reply();
        assert_eq!(reply, ModelReply::default());
    }

    #[test]
    fn http_status_tags_error_kind() {
        let not_found = upstream_error(
            StatusCode::NOT_FOUND,
            r#"{"error":{"code":404,"message":"models/x is missing","status":"NOT_FOUND"}}"#,
        );
        assert_eq!(not_found.kind, UpstreamErrorKind::NotFound);

        let bad_key = upstream_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#,
        );
        assert_eq!(bad_key.kind, UpstreamErrorKind::Unauthorized);

        let denied = upstream_error(StatusCode::FORBIDDEN, "forbidden");
        assert_eq!(denied.kind, UpstreamErrorKind::Unauthorized);
    }

    #[test]
    fn unparsable_error_body_falls_back_to_description() {
        let err = upstream_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded");
        assert_eq!(err.kind, UpstreamErrorKind::Other);
        assert_eq!(err.description, "[500 Internal Server Error] upstream exploded");
    }
}
