//! Handler module organization for the fact-check API.
//!
//! Provides the analysis and health endpoints plus centralized route configuration.

pub mod analyze;
pub mod health;

use actix_web::{HttpResponse, error::InternalError, web};

use crate::detection::GenerativeModel;

/// Registers all API routes under the `/api` scope.
///
/// # Route Structure
/// ```text
/// /api/
/// ├── POST /analyze   - Fact-check text, a link, or an image
/// └── GET  /health    - Liveness and configured model
/// ```
pub fn configure_routes<M: GenerativeModel>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/analyze", web::post().to(analyze::analyze::<M>))
            .route("/health", web::get().to(health::health_check::<M>)),
    );
}

/// JSON extractor configuration with a body limit sized for inline images.
///
/// Extraction failures use the same `{ "error": ... }` body as every other failure.
pub fn json_config(limit_bytes: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit_bytes)
        .error_handler(|err, _req| {
            let body = serde_json::json!({ "error": err.to_string() });
            InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
        })
}
