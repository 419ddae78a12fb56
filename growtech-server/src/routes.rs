//! Page and API routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use growtech::kernel::Outcome;
use growtech::primitives::{SkillLevel, TaskKind, TaskRequest};
use growtech::telemetry::health::HealthReport;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::server::AppState;

type AppStateArc = Arc<AppState>;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Acknowledgement shown after feedback is submitted.
pub const FEEDBACK_THANKS: &str =
    "Thanks for your feedback! We'll use it to make GrowTech better! 😊";

// ============================================================================
// Page
// ============================================================================

/// `GET /`
pub fn page_routes() -> Router<AppStateArc> {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// ============================================================================
// Tasks
// ============================================================================

/// `POST /api/tasks/:kind`
pub fn task_routes() -> Router<AppStateArc> {
    Router::new().route("/api/tasks/:kind", post(submit_task))
}

/// Body of a task submission.
#[derive(Debug, Deserialize)]
pub struct TaskBody {
    /// Question, code, or goal.
    #[serde(default)]
    pub text: String,
    /// Only used by the learning path tab.
    #[serde(default)]
    pub skill_level: SkillLevel,
}

/// Body returned when a request is rejected before reaching a controller.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// What was wrong with the request.
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

fn bad_body(rejection: &JsonRejection) -> Response {
    debug!(error = %rejection.body_text(), "rejected request body");
    error_response(StatusCode::BAD_REQUEST, rejection.body_text())
}

async fn submit_task(
    State(state): State<AppStateArc>,
    Path(kind): Path<String>,
    body: Result<Json<TaskBody>, JsonRejection>,
) -> Response {
    let Ok(kind) = kind.parse::<TaskKind>() else {
        debug!(%kind, "unknown task kind");
        return error_response(StatusCode::NOT_FOUND, format!("unknown task `{kind}`"));
    };
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return bad_body(&rejection),
    };

    let request = TaskRequest::new(kind, body.text).with_skill_level(body.skill_level);
    let outcome = state.controllers.submit(&request).await;
    (status_for(&outcome), Json(outcome)).into_response()
}

fn status_for(outcome: &Outcome) -> StatusCode {
    match outcome {
        Outcome::Rendered { .. } => StatusCode::OK,
        Outcome::EmptyInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Outcome::GenerationError { .. } => StatusCode::BAD_GATEWAY,
    }
}

// ============================================================================
// Feedback
// ============================================================================

/// `POST /api/feedback`
pub fn feedback_routes() -> Router<AppStateArc> {
    Router::new().route("/api/feedback", post(submit_feedback))
}

/// Body of a feedback submission.
#[derive(Debug, Deserialize)]
pub struct FeedbackBody {
    /// Free-form feedback.
    #[serde(default)]
    pub text: String,
}

/// Response to a feedback submission.
#[derive(Debug, Serialize)]
pub struct FeedbackAck {
    /// Thank-you message; absent when nothing was submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

async fn submit_feedback(body: Result<Json<FeedbackBody>, JsonRejection>) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return bad_body(&rejection),
    };
    if body.text.trim().is_empty() {
        return Json(FeedbackAck { message: None }).into_response();
    }
    info!(chars = body.text.chars().count(), "feedback received");
    Json(FeedbackAck {
        message: Some(FEEDBACK_THANKS),
    })
    .into_response()
}

// ============================================================================
// Health
// ============================================================================

/// `GET /health`
pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthReport> {
    let backend = state
        .controllers
        .client()
        .and_then(|client| client.metadata())
        .map(|metadata| (metadata.provider().to_owned(), metadata.model().to_owned()));
    Json(HealthReport::new(state.start_time, backend))
}
