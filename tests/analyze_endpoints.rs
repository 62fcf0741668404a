//! Integration tests for the analysis and health endpoints.
//!
//! Each test wires the real routes around a fake model, so no network access is needed.

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use actix_web::{App, http::StatusCode, test, web};
use fakecheck_server::{
    AppConfig, AppState, EMPTY_INPUT_MESSAGE, INVALID_CREDENTIAL_MESSAGE,
    MODEL_UNAVAILABLE_MESSAGE, UNREADABLE_RESPONSE_MESSAGE, UpstreamError, UpstreamErrorKind,
    detection::{ContentPart, GenerativeModel, GroundingChunk, ModelReply, RequestPayload},
    handlers,
};
use serde_json::{Value, json};

/// Replays one canned reply and records what it was asked.
struct FakeModel {
    reply: Mutex<Option<Result<ModelReply, UpstreamError>>>,
    calls: AtomicUsize,
    seen_parts: Mutex<Vec<ContentPart>>,
}

impl FakeModel {
    fn replying(reply: Result<ModelReply, UpstreamError>) -> Self {
        Self {
            reply: Mutex::new(Some(reply)),
            calls: AtomicUsize::new(0),
            seen_parts: Mutex::new(Vec::new()),
        }
    }

    fn text(text: &str, urls: &[&str]) -> Self {
        Self::replying(Ok(ModelReply {
            text: Some(text.to_string()),
            grounding_chunks: urls.iter().map(|u| GroundingChunk::web(*u)).collect(),
        }))
    }
}

impl GenerativeModel for FakeModel {
    fn model_id(&self) -> &str {
        "fake-model"
    }

    async fn generate<'a>(&'a self, payload: &'a RequestPayload) -> Result<ModelReply, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_parts.lock().unwrap() = payload.parts.clone();
        self.reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(ModelReply::default()))
    }
}

fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| (key == "GEMINI_API_KEY").then(|| "test-key".to_string()))
        .expect("config")
}

async fn post_analyze(state: AppState<FakeModel>, body: Value) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(handlers::json_config(1024 * 1024))
            .configure(handlers::configure_routes::<FakeModel>),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/analyze")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

#[actix_web::test]
async fn text_analysis_returns_result_and_report() {
    let state = AppState::with_model(
        test_config(),
        FakeModel::text(
            "```json\n{\"verdict\":\"FAKE\",\"title\":\"T\",\"reason\":\"R\",\"confidenceScore\":80}\n```",
            &["https://www.a.com/x", "https://www.a.com/x", "https://b.org"],
        ),
    );

    let (status, body) = post_analyze(state.clone(), json!({ "text": "Did this happen?" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["verdict"], "FAKE");
    assert_eq!(body["result"]["title"], "T");
    assert_eq!(body["result"]["confidenceScore"], 80);
    assert_eq!(
        body["result"]["groundingUrls"],
        json!(["https://www.a.com/x", "https://b.org"])
    );
    assert_eq!(body["report"]["sources"][0]["host"], "a.com");
    assert_eq!(body["report"]["tone"], "red");
    assert!(body["analyzedAt"].is_string());
    assert_eq!(state.analyzer.model().calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn link_mode_is_wrapped_before_dispatch() {
    let state = AppState::with_model(test_config(), FakeModel::text("{\"verdict\":\"REAL\"}", &[]));

    let (status, _) = post_analyze(
        state.clone(),
        json!({ "mode": "link", "text": "https://example.com/story" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        *state.analyzer.model().seen_parts.lock().unwrap(),
        vec![ContentPart::Text(
            "লিংকটি যাচাই করুন: https://example.com/story".to_string()
        )]
    );
}

#[actix_web::test]
async fn image_mode_sends_image_before_caption() {
    let state = AppState::with_model(test_config(), FakeModel::text("{\"verdict\":\"AI_GENERATED\"}", &[]));

    let (status, body) = post_analyze(
        state.clone(),
        json!({
            "mode": "image",
            "text": "caption",
            "image": "data:image/png;base64,iVBORw0KGgo="
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["verdict"], "AI_GENERATED");
    let parts = state.analyzer.model().seen_parts.lock().unwrap().clone();
    assert_eq!(parts.len(), 2);
    assert!(matches!(&parts[0], ContentPart::InlineImage(img) if img.mime_type == "image/png"));
    assert_eq!(parts[1], ContentPart::Text("caption".to_string()));
}

#[actix_web::test]
async fn empty_input_is_rejected_without_calling_the_model() {
    let state = AppState::with_model(test_config(), FakeModel::text("{}", &[]));

    let (status, body) = post_analyze(state.clone(), json!({ "mode": "text", "text": "   " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": EMPTY_INPUT_MESSAGE }));
    assert_eq!(state.analyzer.model().calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn credential_failure_maps_to_display_message() {
    let state = AppState::with_model(
        test_config(),
        FakeModel::replying(Err(UpstreamError::from_description(
            "[400 Bad Request] API key not valid. Please pass a valid API key.",
        ))),
    );

    let (status, body) = post_analyze(state, json!({ "text": "hello" })).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "error": INVALID_CREDENTIAL_MESSAGE }));
}

#[actix_web::test]
async fn tagged_not_found_maps_to_unavailable_message() {
    let state = AppState::with_model(
        test_config(),
        FakeModel::replying(Err(UpstreamError::new(
            UpstreamErrorKind::NotFound,
            "model gone",
        ))),
    );

    let (status, body) = post_analyze(state, json!({ "text": "hello" })).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], MODEL_UNAVAILABLE_MESSAGE);
}

#[actix_web::test]
async fn prose_only_reply_is_unreadable() {
    let state = AppState::with_model(test_config(), FakeModel::text("I cannot help with that.", &[]));

    let (status, body) = post_analyze(state, json!({ "text": "hello" })).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], UNREADABLE_RESPONSE_MESSAGE);
    assert!(body.get("result").is_none());
}

#[actix_web::test]
async fn malformed_body_uses_error_envelope() {
    let state = AppState::with_model(test_config(), FakeModel::text("{}", &[]));

    let (status, body) = post_analyze(state, json!({ "mode": "video" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn health_reports_model() {
    let state = AppState::with_model(test_config(), FakeModel::text("{}", &[]));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(handlers::configure_routes::<FakeModel>),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({ "status": "ok", "model": "fake-model" }));
}
