//! Content analysis against the upstream generative model.
//!
//! - [`composer`] builds the request payload
//! - [`gemini`] talks to the Gemini REST API
//! - [`normalizer`] turns the reply into an [`AnalysisResult`](crate::models::AnalysisResult)

pub mod composer;
pub mod gemini;
pub mod normalizer;

pub use composer::*;
pub use gemini::GeminiClient;
pub use normalizer::*;

use crate::errors::UpstreamError;

/// Raw reply of one upstream call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    /// Free-form text of the first candidate, if any
    pub text: Option<String>,
    /// Citation records from the grounding metadata
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// A generative model that accepts a composed payload.
///
/// The production implementation is [`GeminiClient`]; tests substitute a fake.
pub trait GenerativeModel: Send + Sync + 'static {
    /// Model identifier reported by the health endpoint.
    fn model_id(&self) -> &str;

    fn generate<'a>(
        &'a self,
        payload: &'a RequestPayload,
    ) -> impl Future<Output = Result<ModelReply, UpstreamError>> + 'a;
}
