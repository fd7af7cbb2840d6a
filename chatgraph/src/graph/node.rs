//! Graph node trait: one unit of work in a StateGraph.
//!
//! Receives a read-only snapshot of every channel and returns a partial update. The
//! executor merges the update through each channel's reducer; routing is decided by
//! edges, not by the node.

use std::future::Future;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::state::{Snapshot, Update};

use super::RunContext;

/// One step in a graph: snapshot in, partial update out.
///
/// Nodes are stateless with respect to the run; everything they need from the run
/// is in the snapshot. Clients (LLM, tools) are injected at construction.
///
/// **Interaction**: Registered via `StateGraph::add_node`; called by
/// `CompiledStateGraph::invoke` / `stream`, optionally wrapped by `NodeMiddleware`.
#[async_trait]
pub trait Node: Send + Sync {
    async fn run(&self, state: &Snapshot) -> Result<Update, AgentError>;

    /// Streaming-aware variant; called instead of `run` when the graph is streamed.
    /// Default delegates to `run`.
    async fn run_with_context(
        &self,
        state: &Snapshot,
        _ctx: &RunContext,
    ) -> Result<Update, AgentError> {
        self.run(state).await
    }
}

/// Node backed by an async closure. Created by `StateGraph::add_fn_node`.
pub struct FnNode<F> {
    f: F,
}

impl<F> FnNode<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Node for FnNode<F>
where
    F: Fn(Snapshot) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Update, AgentError>> + Send,
{
    async fn run(&self, state: &Snapshot) -> Result<Update, AgentError> {
        (self.f)(state.clone()).await
    }
}
