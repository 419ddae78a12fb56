use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use growtech::adapters::traits::{
    AdapterError, AdapterMetadata, AdapterResult, GenerationBackend, GenerationRequest,
};
use growtech::kernel::{
    ClientConfig, CollectingObserver, ControllerSet, GENERIC_FAILURE_MESSAGE, GenerationClient,
};
use growtech_server::{AppState, app, routes::FEEDBACK_THANKS};
use serde_json::{Value, json};
use tower::ServiceExt;

struct FakeBackend {
    metadata: AdapterMetadata,
    calls: AtomicUsize,
    fail: bool,
}

impl FakeBackend {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            metadata: AdapterMetadata::new("fake", "tutor"),
            calls: AtomicUsize::new(0),
            fail,
        })
    }
}

#[async_trait]
impl GenerationBackend for FakeBackend {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn generate(&self, request: GenerationRequest) -> AdapterResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AdapterError::transport("connection refused to 10.0.0.7"));
        }
        Ok(format!("generated for: {}", request.prompt()))
    }
}

fn router(backend: Arc<FakeBackend>) -> Router {
    let client = Arc::new(GenerationClient::with_backend(backend, ClientConfig::default()));
    let controllers = ControllerSet::new(client, 300, CollectingObserver::new());
    app(Arc::new(AppState::new(controllers)))
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn index_serves_all_three_tabs() {
    let response = router(FakeBackend::new(false))
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("Coding Q&amp;A"));
    assert!(page.contains("Debug Code"));
    assert!(page.contains("Learning Path"));
}

#[tokio::test]
async fn qa_submission_renders_answer() {
    let backend = FakeBackend::new(false);
    let (status, body) = send(
        router(Arc::clone(&backend)),
        post("/api/tasks/qa", &json!({ "text": "Explain Python loops" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rendered");
    assert_eq!(body["heading"], "Answer");
    assert!(
        body["text"]
            .as_str()
            .unwrap()
            .ends_with("Respond to: Explain Python loops")
    );
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn learning_path_uses_skill_level() {
    let (status, body) = send(
        router(FakeBackend::new(false)),
        post(
            "/api/tasks/learning-path",
            &json!({ "text": "Learn Rust", "skill_level": "Advanced" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["text"],
        "generated for: Suggest a 4-week learning path for a advanced to achieve: Learn Rust"
    );
}

#[tokio::test]
async fn empty_input_is_unprocessable_and_skips_model() {
    let backend = FakeBackend::new(false);
    let (status, body) = send(
        router(Arc::clone(&backend)),
        post("/api/tasks/debug", &json!({ "text": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "empty_input");
    assert_eq!(body["message"], "Please paste some code to debug!");
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn backend_failure_is_bad_gateway_with_generic_message() {
    let (status, body) = send(
        router(FakeBackend::new(true)),
        post("/api/tasks/qa", &json!({ "text": "What is a closure?" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "generation_error");
    assert_eq!(body["message"], GENERIC_FAILURE_MESSAGE);
    assert!(!body.to_string().contains("10.0.0.7"));
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let (status, _) = send(
        router(FakeBackend::new(false)),
        post("/api/tasks/essay", &json!({ "text": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_skill_level_is_a_json_bad_request() {
    let backend = FakeBackend::new(false);
    let (status, body) = send(
        router(Arc::clone(&backend)),
        post(
            "/api/tasks/learning-path",
            &json!({ "text": "Learn Rust", "skill_level": "expert" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("expert"));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_feedback_is_a_json_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/feedback")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(router(FakeBackend::new(false)), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn feedback_is_acknowledged_only_when_present() {
    let (status, body) = send(
        router(FakeBackend::new(false)),
        post("/api/feedback", &json!({ "text": "More Rust examples please" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], FEEDBACK_THANKS);

    let (status, body) = send(
        router(FakeBackend::new(false)),
        post("/api/feedback", &json!({ "text": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn health_reports_backend_after_first_call() {
    let router = router(FakeBackend::new(false));

    let (_, before) = send(
        router.clone(),
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(before["backend_loaded"], false);
    assert_eq!(before["status"], "starting");

    send(
        router.clone(),
        post("/api/tasks/qa", &json!({ "text": "hi" })),
    )
    .await;

    let (_, after) = send(router, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(after["backend_loaded"], true);
    assert_eq!(after["provider"], "fake");
    assert_eq!(after["model"], "tutor");
}
