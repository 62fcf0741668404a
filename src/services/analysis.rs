//! Analysis pipeline for one user submission.
//!
//! This module defines the async orchestration that:
//! - Composes the request payload (fails fast on empty input)
//! - Calls the upstream generative model
//! - Normalizes the reply into an [`AnalysisResult`]
//!
//! No retries are attempted; a failure surfaces immediately so the caller
//! can resubmit.

use tracing::{debug, info, instrument, warn};

use crate::{
    detection::{GenerativeModel, RequestComposer, normalize},
    errors::AnalysisError,
    models::AnalysisResult,
};

/// Runs compose, upstream call and normalization against an injected model.
pub struct AnalysisService<M> {
    composer: RequestComposer,
    model: M,
}

impl<M: GenerativeModel> AnalysisService<M> {
    pub fn new(composer: RequestComposer, model: M) -> Self {
        Self { composer, model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Analyzes optional text and an optional data-URL image.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::Compose`] before any network call for empty or undecodable input
    /// - [`AnalysisError::Upstream`] when the model call fails
    /// - [`AnalysisError::Parse`] when the reply cannot be reduced to a JSON object
    #[instrument(
        skip_all,
        fields(
            model = %self.model.model_id(),
            has_text = text.is_some(),
            has_image = image_data_url.is_some()
        )
    )]
    pub async fn analyze(
        &self,
        text: Option<&str>,
        image_data_url: Option<&str>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let payload = self
            .composer
            .compose(text, image_data_url)
            .inspect_err(|e| warn!(error = %e, "Rejected analysis input"))?;
        debug!(parts = payload.parts.len(), "Request payload composed");

        let reply = self
            .model
            .generate(&payload)
            .await
            .inspect_err(|e| warn!(kind = ?e.kind, error = %e, "Upstream model call failed"))?;

        let raw = reply.text.as_deref().unwrap_or_default();
        let result = normalize(raw, &reply.grounding_chunks).inspect_err(|e| {
            warn!(parse_error = e.kind(), error = %e, "Could not normalize model reply");
            debug!(raw_response = raw, "Raw model reply");
        })?;

        info!(
            verdict = ?result.verdict,
            confidence = result.confidence_score,
            sources = result.grounding_urls.len(),
            "Analysis completed"
        );
        Ok(result)
    }
}
