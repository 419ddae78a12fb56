use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use growtech::adapters::traits::{
    AdapterMetadata, AdapterResult, GenerationBackend, GenerationRequest,
};
use growtech::kernel::{
    ClientConfig, CollectingObserver, ControllerSet, GenerationClient, shared,
};
use growtech_server::{AppState, app};
use serde_json::Value;
use tower::ServiceExt;

struct NamedBackend(AdapterMetadata);

#[async_trait]
impl GenerationBackend for NamedBackend {
    fn metadata(&self) -> &AdapterMetadata {
        &self.0
    }

    async fn generate(&self, _request: GenerationRequest) -> AdapterResult<String> {
        Ok(format!("answer from {}", self.0.model()))
    }
}

fn named_client(model: &str) -> Arc<GenerationClient> {
    Arc::new(GenerationClient::with_backend(
        Arc::new(NamedBackend(AdapterMetadata::new("fake", model))),
        ClientConfig::default(),
    ))
}

async fn ask(router: &Router) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/tasks/qa")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"text": "Explain Python loops"}"#))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// One test per binary: the slot is process-wide.
#[tokio::test]
async fn installed_client_serves_the_running_app() {
    shared::teardown();
    shared::install(named_client("primary"));

    let controllers = ControllerSet::shared(300, CollectingObserver::new());
    let router = app(Arc::new(AppState::new(controllers)));

    let (status, body) = ask(&router).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "answer from primary");

    shared::teardown();
    shared::install(named_client("substitute"));
    let (status, body) = ask(&router).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "answer from substitute");

    shared::teardown();
    let (status, body) = ask(&router).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "generation_error");
}
