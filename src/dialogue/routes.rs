//! HTTP endpoints for the dialogue flows.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use super::generator::DialogueGenerator;
use super::model::{
    CompletionBody, CompletionPrompt, DialogueTurn, SummaryBody, SummaryRequest, TurnBody,
    TurnRequest,
};
use crate::error::DialogueError;

/// Shared state for dialogue routes.
#[derive(Clone)]
pub struct DialogueRouteState {
    pub generator: Arc<DialogueGenerator>,
}

/// Build the dialogue router with permissive CORS.
pub fn dialogue_routes(state: DialogueRouteState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/summary", post(summary))
        .route("/generate", post(generate))
        .route("/complete", post(complete))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// Status code and JSON body for a failed flow.
fn error_parts(err: &DialogueError) -> (StatusCode, Value) {
    match err {
        DialogueError::MissingFields(_) => (
            StatusCode::BAD_REQUEST,
            json!({"error": "Missing required fields"}),
        ),
        DialogueError::Generation(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Generation failed"}),
        ),
        DialogueError::InvalidModelOutput(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Model returned invalid JSON", "raw": e.raw}),
        ),
        DialogueError::Timeout(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            json!({"error": "Generation timed out"}),
        ),
    }
}

impl IntoResponse for DialogueError {
    fn into_response(self) -> Response {
        let (status, body) = error_parts(&self);
        (status, Json(body)).into_response()
    }
}

/// A body that is not valid JSON is handled as one with every field missing.
fn body_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> T {
    match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable request body");
            T::default()
        }
    }
}

// ── Health ──────────────────────────────────────────────────────────────

/// GET /
///
/// Liveness only; never touches the model provider.
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Gemini backend alive"
    }))
}

// ── Flows ───────────────────────────────────────────────────────────────

/// POST /summary
async fn summary(
    State(state): State<DialogueRouteState>,
    body: Result<Json<SummaryBody>, JsonRejection>,
) -> Result<Json<Value>, DialogueError> {
    let span = info_span!("summary", request_id = %Uuid::new_v4());
    async move {
        let request = SummaryRequest::try_from(body_or_default(body))?;
        let text = state.generator.summarize(&request).await?;
        Ok(Json(json!({ "text": text })))
    }
    .instrument(span)
    .await
}

/// POST /generate
///
/// Success body is the flattened dialogue turn.
async fn generate(
    State(state): State<DialogueRouteState>,
    body: Result<Json<TurnBody>, JsonRejection>,
) -> Result<Json<DialogueTurn>, DialogueError> {
    let span = info_span!("generate", request_id = %Uuid::new_v4());
    async move {
        let request = TurnRequest::try_from(body_or_default(body))?;
        let turn = state.generator.next_turn(&request).await?;
        Ok(Json(turn))
    }
    .instrument(span)
    .await
}

/// POST /complete
///
/// Every response carries a `success` flag.
async fn complete(
    State(state): State<DialogueRouteState>,
    body: Result<Json<CompletionBody>, JsonRejection>,
) -> Response {
    let span = info_span!("complete", request_id = %Uuid::new_v4());
    async move {
        let result = match CompletionPrompt::try_from(body_or_default(body)) {
            Ok(prompt) => state.generator.complete_raw(&prompt).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(content) => Json(json!({"success": true, "content": content})).into_response(),
            Err(e) => {
                let (status, mut body) = error_parts(&e);
                body["success"] = Value::Bool(false);
                (status, Json(body)).into_response()
            }
        }
    }
    .instrument(span)
    .await
}
