//! Route handlers and router construction.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::sse::{KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chatgraph::{Message, RunnableConfig};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info_span};

use crate::error::ApiError;
use crate::sse::{done, to_sse};
use crate::AppState;

/// Body of `POST /v1/runs`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRunRequest {
    pub message: String,
    /// Conversation to continue; a new one is started when absent.
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub stream: bool,
}

/// JSON result of a run: the thread id and its full message list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub thread_id: String,
    pub messages: Vec<Message>,
}

/// Builds the router with CORS and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/runs", post(create_run))
        .route("/v1/threads/:thread_id", get(get_thread))
        .layer(
            TraceLayer::new_for_http().make_span_with(
                |req: &axum::http::Request<axum::body::Body>| {
                    info_span!("request", method = %req.method(), uri = %req.uri())
                },
            ),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn run_config(state: &AppState, thread_id: &str) -> RunnableConfig {
    let config = RunnableConfig::for_thread(thread_id);
    match state.recursion_limit {
        Some(limit) => config.with_recursion_limit(limit),
        None => config,
    }
}

async fn create_run(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRunRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        debug!(status = %rejection.status(), error = %rejection.body_text(), "run body rejected");
        ApiError::BadRequest("body must be a JSON object with a string `message`".to_string())
    })?;
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }
    let thread_id = req
        .thread_id
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let config = run_config(&state, &thread_id);
    debug!(thread_id = %thread_id, stream = req.stream, "run requested");

    if req.stream {
        let events = state.runner.stream(&req.message, Some(config))?;
        let stream = events
            .map(to_sse)
            .chain(tokio_stream::once(done(&thread_id)))
            .map(Ok::<_, Infallible>);
        return Ok(Sse::new(stream)
            .keep_alive(KeepAlive::default())
            .into_response());
    }

    let snapshot = state.runner.invoke(&req.message, Some(config)).await?;
    let messages = snapshot
        .messages()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(RunResponse {
        thread_id,
        messages,
    })
    .into_response())
}

async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> Result<Json<RunResponse>, ApiError> {
    let snapshot = state
        .runner
        .graph()
        .get_state(&RunnableConfig::for_thread(&thread_id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("thread {}", thread_id)))?;
    let messages = snapshot
        .messages()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(RunResponse {
        thread_id,
        messages,
    }))
}
