//! chatgraph-server library: axum routes running one chat turn per request.
//!
//! - `GET /health`
//! - `POST /v1/runs` `{message, thread_id?, stream?}`: JSON `{thread_id, messages}`, or an
//!   SSE stream of `token`, `update`, `values`, `error` and `done` events when `stream` is true.
//! - `GET /v1/threads/:thread_id`: persisted messages of a thread.
//!
//! Failures use one body shape, `{"error": {"kind", "node"?, "message"}}`.

mod error;
mod routes;
mod sse;

use std::sync::Arc;

use chatgraph::ChatRunner;

pub use error::ApiError;
pub use routes::{app, CreateRunRequest, RunResponse};

/// Shared state for all routes.
pub struct AppState {
    pub runner: Arc<ChatRunner>,
    /// Step limit applied to every run; `None` uses the graph default.
    pub recursion_limit: Option<usize>,
}

impl AppState {
    pub fn new(runner: ChatRunner) -> Self {
        Self {
            runner: Arc::new(runner),
            recursion_limit: None,
        }
    }

    pub fn with_recursion_limit(mut self, limit: Option<usize>) -> Self {
        self.recursion_limit = limit;
        self
    }
}
