//! Fact-check analysis endpoint.
//!
//! Accepts text, a link, or an image from the browser UI, runs the analysis
//! pipeline, and returns either the normalized result with its display-ready
//! report or a single localized error string.

use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    AppState,
    detection::GenerativeModel,
    models::{AnalysisResult, AnalyzeRequest},
    report::ReportView,
};

/// Successful response body of `POST /api/analyze`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub result: AnalysisResult,
    pub report: ReportView,
    pub analyzed_at: DateTime<Utc>,
}

/// Analyzes the submitted content for authenticity.
///
/// # HTTP Method
/// `POST /api/analyze`
///
/// # Request Body (JSON)
/// ```json
/// {
///   "mode": "image",                          // "text" | "link" | "image", default "text"
///   "text": "optional caption",
///   "image": "data:image/png;base64,iVBOR..." // honoured in image mode only
/// }
/// ```
///
/// # Success Response (200 OK)
/// ```json
/// {
///   "result": {
///     "verdict": "FAKE",
///     "title": "...",
///     "reason": "...",
///     "confidenceScore": 85,
///     "groundingUrls": ["https://..."]
///   },
///   "report": { "label": "...", "tone": "red", "sources": [{ "host": "...", "url": "..." }], ... },
///   "analyzedAt": "2024-01-15T10:30:00Z"
/// }
/// ```
///
/// # Error Responses
/// Every failure body is `{ "error": "<display string>" }`.
/// - `400 Bad Request`: validation failure, no text or image, undecodable image
/// - `502 Bad Gateway`: upstream failure or unreadable model reply
#[instrument(skip(app_state, payload), fields(mode = ?payload.mode))]
pub async fn analyze<M: GenerativeModel>(
    app_state: web::Data<AppState<M>>,
    payload: web::Json<AnalyzeRequest>,
) -> impl Responder {
    if let Err(e) = payload.validate() {
        warn!(error = %e, "Analysis request failed validation");
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }));
    }

    let text = payload.prompt_text();
    match app_state
        .analyzer
        .analyze(text.as_deref(), payload.image_data_url())
        .await
    {
        Ok(result) => {
            info!(verdict = ?result.verdict, "Returning analysis result");
            let report = ReportView::from(&result);
            HttpResponse::Ok().json(AnalyzeResponse {
                result,
                report,
                analyzed_at: Utc::now(),
            })
        }
        Err(e) => {
            let body = serde_json::json!({ "error": e.user_message() });
            if e.is_client_error() {
                HttpResponse::BadRequest().json(body)
            } else {
                HttpResponse::BadGateway().json(body)
            }
        }
    }
}
