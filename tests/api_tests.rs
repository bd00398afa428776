use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use taxbuddy_lib::{
    api::router,
    commands::{documents, sessions},
    core::{
        config::AppConfig,
        errors::{AppError, AppResult},
        types::CreateSessionRequest,
    },
    db::Database,
    providers::{LanguageModel, ModelRequest},
    AppState,
};
use tower::ServiceExt;

#[derive(Default)]
struct QueuedModel {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<usize>,
}

impl QueuedModel {
    fn reply(&self, text: &str) {
        self.replies
            .lock()
            .expect("replies lock")
            .push_back(text.to_string());
    }

    fn calls(&self) -> usize {
        *self.calls.lock().expect("calls lock")
    }
}

#[async_trait]
impl LanguageModel for QueuedModel {
    async fn generate(&self, _request: ModelRequest) -> AppResult<String> {
        *self.calls.lock().expect("calls lock") += 1;
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .ok_or_else(|| AppError::Internal("no queued reply".to_string()))
    }
}

const EXTRACTION: &str = "{\"personal_info\": {\"name\": \"A Taxpayer\", \"assessment_year\": \"2024-25\"}, \"deductions_claimed\": [{\"section\": \"80C\", \"amount\": 50000}]}";

const CALCULATION: &str = "Working...\n<JSON_OUTPUT>{\"final_amount_due_under_recommendation\": 1200, \"status\": \"Tax Due\"}</JSON_OUTPUT>";

async fn setup_with_document() -> (Router, AppState, Arc<QueuedModel>, String) {
    let db = Database::in_memory().await.expect("db should initialize");
    let model = Arc::new(QueuedModel::default());
    let state = AppState::new(db, model.clone(), AppConfig::new("test-key"));
    let session = sessions::create_session(
        &state,
        CreateSessionRequest {
            owner: "alice".to_string(),
        },
    )
    .await
    .expect("create session");

    model.reply(EXTRACTION);
    documents::upload_document(&state, &session.session_id, "form16.pdf", None, b"%PDF".to_vec())
        .await
        .expect("upload");
    (router(state.clone()), state, model, session.session_id)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header(header::CONTENT_TYPE, "application/json");
    }
    let request = request
        .body(body.map(|text| Body::from(text.to_string())).unwrap_or_else(Body::empty))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn malformed_calculate_body_is_rejected_before_the_model() {
    let (app, _state, model, session_id) = setup_with_document().await;
    let uri = format!("/sessions/{session_id}/calculate");

    let (status, body) = send(&app, Method::POST, &uri, Some("{\"user80d\": \"abc\"}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["message"].as_str().expect("message").contains("invalid JSON body"));

    let (status, body) = send(&app, Method::POST, &uri, Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(model.calls(), 1, "only the extraction reached the model");
}

#[tokio::test]
async fn blank_calculate_body_uses_session_defaults() {
    let (app, state, model, session_id) = setup_with_document().await;
    let uri = format!("/sessions/{session_id}/calculate");

    model.reply(CALCULATION);
    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["finalPosition"]["kind"], "tax_due");

    model.reply(CALCULATION);
    let (status, _) = send(&app, Method::POST, &uri, Some("{\"user80d\": 12000}")).await;
    assert_eq!(status, StatusCode::OK);

    let snapshot = sessions::get_session(&state, &session_id).await.expect("snapshot");
    assert_eq!(snapshot.user80d, 12000.0);
    assert_eq!(model.calls(), 3);
}

#[tokio::test]
async fn extractor_rejections_use_the_error_body() {
    let (app, _state, _model, session_id) = setup_with_document().await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/sessions/{session_id}/deductions/not-a-number"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/sessions")
        .body(Body::from("{\"owner\": \"bob\"}"))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let body: Value = serde_json::from_slice(&bytes).expect("json error body");
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/sessions/{session_id}/document"),
        Some("{}"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn deleted_session_returns_not_found() {
    let (app, _state, _model, session_id) = setup_with_document().await;
    let uri = format!("/sessions/{session_id}");

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
