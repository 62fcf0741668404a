//! Error taxonomy and user-facing error classification.
//!
//! Every failure produced while composing a request, calling the upstream
//! model, or normalizing its reply ends up as an [`AnalysisError`]. The HTTP
//! layer never forwards these structures; it calls
//! [`AnalysisError::user_message`] and sends the display string only.

use thiserror::Error;

/// Shown when neither text nor an image was supplied.
pub const EMPTY_INPUT_MESSAGE: &str = "বিশ্লেষণ করার জন্য কোনো তথ্য বা ছবি দেওয়া হয়নি।";
/// Shown when the supplied image payload could not be decoded.
pub const INVALID_IMAGE_MESSAGE: &str = "ছবিটি পড়া যাচ্ছে না। অন্য একটি ছবি দিয়ে চেষ্টা করুন।";
/// Shown for every [`ParseError`] subtype.
pub const UNREADABLE_RESPONSE_MESSAGE: &str =
    "AI এর উত্তর সঠিকভাবে পড়া যাচ্ছে না (JSON Error)। দয়া করে আবার চেষ্টা করুন।";
/// Shown when the model or service is unavailable.
pub const MODEL_UNAVAILABLE_MESSAGE: &str =
    "মডেল সার্ভিসে সমস্যা হচ্ছে (Model not found)। কিছুক্ষণ পর চেষ্টা করুন।";
/// Shown when the upstream service rejects the credential.
pub const INVALID_CREDENTIAL_MESSAGE: &str = "API Key সঠিক নয়।";

/// Failures raised before any network call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// Neither text nor an image was supplied.
    #[error("no text or image supplied")]
    EmptyInput,
    /// The image payload is not valid base64.
    #[error("image payload is not valid base64: {0}")]
    InvalidImage(String),
}

/// Failures reducing the upstream reply text to a JSON object.
///
/// All variants collapse to the same user-facing message but stay distinct
/// for logs and tests.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty response")]
    EmptyResponse,
    #[error("invalid structure")]
    InvalidStructure,
    #[error("malformed json: {0}")]
    MalformedJson(#[source] serde_json::Error),
}

impl ParseError {
    /// Short stable tag used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::EmptyResponse => "empty_response",
            ParseError::InvalidStructure => "invalid_structure",
            ParseError::MalformedJson(_) => "malformed_json",
        }
    }
}

/// Structured tag attached to an upstream failure where it is first observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    NotFound,
    Unauthorized,
    Other,
}

/// The upstream call itself failed.
#[derive(Debug, Error)]
#[error("{description}")]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,
    pub description: String,
}

impl UpstreamError {
    /// Builds an error with a kind already known from the transport.
    pub fn new(kind: UpstreamErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    /// Builds an error whose kind is derived from its description only.
    pub fn from_description(description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            kind: classify_description(&description),
            description,
        }
    }

    pub fn user_message(&self) -> String {
        match self.kind {
            UpstreamErrorKind::NotFound => MODEL_UNAVAILABLE_MESSAGE.to_string(),
            UpstreamErrorKind::Unauthorized => INVALID_CREDENTIAL_MESSAGE.to_string(),
            UpstreamErrorKind::Other => format!("সমস্যা হয়েছে: {}", self.description),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        Self::from_description(err.to_string())
    }
}

/// Last-resort classification of a free-form upstream failure description.
///
/// Checked in priority order: not-found markers first, then credential
/// markers, then everything else.
pub fn classify_description(description: &str) -> UpstreamErrorKind {
    if description.contains("404") || description.contains("not found") {
        UpstreamErrorKind::NotFound
    } else if description.contains("API key") {
        UpstreamErrorKind::Unauthorized
    } else {
        UpstreamErrorKind::Other
    }
}

/// Any failure surfaced by an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl AnalysisError {
    /// Display-ready message for the UI.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Compose(ComposeError::EmptyInput) => EMPTY_INPUT_MESSAGE.to_string(),
            AnalysisError::Compose(ComposeError::InvalidImage(_)) => {
                INVALID_IMAGE_MESSAGE.to_string()
            }
            AnalysisError::Parse(_) => UNREADABLE_RESPONSE_MESSAGE.to_string(),
            AnalysisError::Upstream(e) => e.user_message(),
        }
    }

    /// True when the failure was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AnalysisError::Compose(_))
    }
}
