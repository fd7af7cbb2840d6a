//! Node middleware: wraps every node call of a compiled graph.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::state::{Snapshot, Update};

/// Boxed future of one node call.
pub type NodeFuture = Pin<Box<dyn Future<Output = Result<Update, AgentError>> + Send>>;

/// The wrapped node call handed to `around_run`.
pub type NodeCall = Box<dyn FnOnce(Snapshot) -> NodeFuture + Send>;

/// Runs around each `Node::run`; may inspect or replace the input and the result.
///
/// **Interaction**: Set with `StateGraph::with_middleware`; the executor calls
/// `around_run` once per node per step.
#[async_trait]
pub trait NodeMiddleware: Send + Sync {
    async fn around_run(
        &self,
        node_id: &str,
        state: Snapshot,
        inner: NodeCall,
    ) -> Result<Update, AgentError>;
}

/// Middleware that logs node enter/exit with the updated keys and elapsed time.
pub struct LoggingNodeMiddleware;

#[async_trait]
impl NodeMiddleware for LoggingNodeMiddleware {
    async fn around_run(
        &self,
        node_id: &str,
        state: Snapshot,
        inner: NodeCall,
    ) -> Result<Update, AgentError> {
        tracing::info!(node = node_id, "node enter");
        let started = Instant::now();
        let result = inner(state).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(update) => {
                let keys: Vec<&str> = update.keys().collect();
                tracing::info!(node = node_id, ?keys, elapsed_ms, "node exit");
            }
            Err(e) => tracing::warn!(node = node_id, error = %e, elapsed_ms, "node failed"),
        }
        result
    }
}
