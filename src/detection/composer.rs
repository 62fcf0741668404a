//! Builds the multi-part content payload sent to the upstream model.
//!
//! The composer never touches the network. It validates input, orders the
//! parts (image before text) and attaches the fixed system instruction and
//! web-grounding flag.

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::errors::ComposeError;

/// Prefix prepended to link inputs so the model treats them as a verification task.
pub const LINK_PROMPT_PREFIX: &str = "লিংকটি যাচাই করুন: ";

/// MIME type used when the declared one is missing or unsupported.
pub const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

const SUPPORTED_IMAGE_MIMES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/heif",
];

/// Wraps a URL with the fixed verification prompt.
pub fn wrap_link(url: &str) -> String {
    format!("{LINK_PROMPT_PREFIX}{url}")
}

/// Decoded inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// Decodes a `data:<mime>;base64,<payload>` string.
    ///
    /// A bare base64 string without the scheme prefix is accepted as well.
    /// Returns `Ok(None)` for a blank input.
    ///
    /// # Errors
    ///
    /// [`ComposeError::InvalidImage`] if the payload is not valid base64.
    pub fn from_data_url(data_url: &str) -> Result<Option<Self>, ComposeError> {
        let data_url = data_url.trim();
        if data_url.is_empty() {
            return Ok(None);
        }

        let (header, encoded) = match data_url.split_once(',') {
            Some((header, encoded)) => (Some(header), encoded),
            None => (None, data_url),
        };
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Ok(None);
        }

        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| ComposeError::InvalidImage(e.to_string()))?;

        Ok(Some(Self {
            mime_type: header.map_or(FALLBACK_IMAGE_MIME, declared_mime).to_string(),
            bytes,
        }))
    }

    /// Raw payload re-encoded for the wire.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Extracts a supported MIME type from a `data:image/png;base64` header.
fn declared_mime(header: &str) -> &'static str {
    let mime = header
        .trim_start_matches("data:")
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let mime = if mime == "image/jpg" { "image/jpeg".to_string() } else { mime };
    SUPPORTED_IMAGE_MIMES
        .iter()
        .find(|supported| **supported == mime)
        .copied()
        .unwrap_or(FALLBACK_IMAGE_MIME)
}

/// One ordered content part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    InlineImage(ImagePayload),
    Text(String),
}

/// Everything the upstream call needs.
#[derive(Debug, Clone)]
pub struct RequestPayload {
    /// Image first, then text
    pub parts: Vec<ContentPart>,
    pub system_instruction: Arc<str>,
    /// Web-grounded search capability, always enabled
    pub web_search: bool,
}

/// Composes request payloads with a fixed system instruction.
#[derive(Debug, Clone)]
pub struct RequestComposer {
    system_instruction: Arc<str>,
}

impl RequestComposer {
    pub fn new(system_instruction: impl Into<Arc<str>>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
        }
    }

    /// Builds the ordered parts from optional text and an optional data-URL image.
    ///
    /// # Errors
    ///
    /// - [`ComposeError::InvalidImage`] if the image payload does not decode.
    /// - [`ComposeError::EmptyInput`] if both inputs are absent or blank.
    pub fn compose(
        &self,
        text: Option<&str>,
        image_data_url: Option<&str>,
    ) -> Result<RequestPayload, ComposeError> {
        let mut parts = Vec::with_capacity(2);

        if let Some(image) = image_data_url
            .map(ImagePayload::from_data_url)
            .transpose()?
            .flatten()
        {
            parts.push(ContentPart::InlineImage(image));
        }

        if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
            parts.push(ContentPart::Text(text.to_string()));
        }

        if parts.is_empty() {
            return Err(ComposeError::EmptyInput);
        }

        Ok(RequestPayload {
            parts,
            system_instruction: Arc::clone(&self.system_instruction),
            web_search: true,
        })
    }
}
