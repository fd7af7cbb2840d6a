//! Invoke config: thread_id, checkpoint_id, recursion limit, cancellation.
//!
//! Aligns with LangGraph's config["configurable"]. Used by CompiledStateGraph::invoke
//! and Checkpointer.

use tokio_util::sync::CancellationToken;

/// Steps allowed per run when `recursion_limit` is not set.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Config for a single invoke. Identifies the thread and optional checkpoint.
///
/// **Interaction**: Passed to `CompiledStateGraph::invoke(initial, config)` and
/// `Checkpointer::save` / `load` / `list`.
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    /// Conversation id. Required for loading or saving checkpoints.
    pub thread_id: Option<String>,
    /// If set, load state from this checkpoint instead of the latest.
    pub checkpoint_id: Option<String>,
    /// Maximum steps per run; `None` means [`DEFAULT_RECURSION_LIMIT`].
    pub recursion_limit: Option<usize>,
    /// Checked before each step; in-flight node calls are not aborted.
    pub cancel: Option<CancellationToken>,
}

impl RunnableConfig {
    /// Config addressing one conversation thread.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Default::default()
        }
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = Some(limit);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn effective_recursion_limit(&self) -> usize {
        self.recursion_limit.unwrap_or(DEFAULT_RECURSION_LIMIT)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| t.is_cancelled())
    }
}
