//! Health check endpoint for the fact-check API.
//!
//! Provides a simple endpoint to verify service liveness for monitoring and orchestration.

use actix_web::{HttpResponse, Responder, web};

use crate::{AppState, detection::GenerativeModel};

/// Returns a JSON response indicating the API is healthy.
///
/// # Example
/// ```json
/// { "status": "ok", "model": "gemini-2.0-flash" }
/// ```
#[tracing::instrument(skip(app_state))]
pub async fn health_check<M: GenerativeModel>(app_state: web::Data<AppState<M>>) -> impl Responder {
    tracing::info!("Health check endpoint called");
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "model": app_state.analyzer.model().model_id(),
    }))
}
