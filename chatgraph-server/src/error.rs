//! API error type and its JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chatgraph::{ErrorKind, ErrorPayload, GraphError, RunError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// A run failed; the body carries the error kind and node, never upstream text.
    #[error("run failed: {}", .0.message)]
    Run(ErrorPayload),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<GraphError> for ApiError {
    fn from(e: GraphError) -> Self {
        tracing::warn!(error = %e, "run failed");
        ApiError::Run(e.to_payload())
    }
}

impl From<RunError> for ApiError {
    fn from(e: RunError) -> Self {
        match e {
            RunError::Graph(e) => e.into(),
            RunError::Failed(payload) => ApiError::Run(payload),
            RunError::Input(e) => ApiError::BadRequest(e.to_string()),
            other => {
                tracing::error!(error = %other, "run setup failed");
                ApiError::Internal("the run could not be started".to_string())
            }
        }
    }
}

/// HTTP status for a failed run.
pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NodeExecution => StatusCode::BAD_GATEWAY,
        ErrorKind::ConcurrentSessionConflict => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{"error": {...}}` body shared by JSON responses and SSE `error` events.
pub(crate) fn error_body(kind: &str, node: Option<&str>, message: &str) -> serde_json::Value {
    let mut error = json!({ "kind": kind, "message": message });
    if let Some(node) = node {
        error["node"] = json!(node);
    }
    json!({ "error": error })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, error_body("bad_request", None, m)),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, error_body("not_found", None, m)),
            ApiError::Run(p) => (
                status_for(p.kind),
                error_body(p.kind.as_str(), p.node.as_deref(), &p.message),
            ),
            ApiError::Internal(m) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("internal", None, m),
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Run failures map to 502, 409 or 500 by kind.
    #[test]
    fn status_by_kind() {
        assert_eq!(status_for(ErrorKind::NodeExecution), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(ErrorKind::ConcurrentSessionConflict),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(ErrorKind::RecursionLimit),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    /// **Scenario**: The body names kind and node; node is omitted when absent.
    #[test]
    fn error_body_shape() {
        let body = error_body("node_execution", Some("chat"), "a node failed while executing");
        assert_eq!(body["error"]["kind"], "node_execution");
        assert_eq!(body["error"]["node"], "chat");

        let body = error_body("bad_request", None, "message is empty");
        assert!(body["error"].get("node").is_none());
    }
}
