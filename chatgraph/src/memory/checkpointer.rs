//! Checkpointer trait and CheckpointError.
//!
//! Saves and loads checkpoints by (thread_id, checkpoint_id). Aligns with
//! LangGraph BaseCheckpointSaver.

use async_trait::async_trait;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem};
use crate::memory::config::RunnableConfig;
use crate::memory::thread_lock::ThreadLease;

/// Error type for checkpoint operations.
///
/// Used by Checkpointer::save, load, list, clear and by Serializer.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("thread_id required")]
    ThreadIdRequired,
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("thread '{0}' is already in use by another run")]
    SessionConflict(String),
}

/// Saves and loads checkpoints keyed by conversation.
///
/// Implementations: [`MemorySaver`](super::MemorySaver) (in-memory),
/// [`SqliteSaver`](super::SqliteSaver) (feature `sqlite`).
///
/// **Interaction**: Injected at compile via `StateGraph::compile_with_checkpointer`;
/// `CompiledStateGraph::invoke` uses it when `config.thread_id` is set.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Persists a checkpoint for `config.thread_id`. Returns the checkpoint id used.
    async fn save(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint,
    ) -> Result<String, CheckpointError>;

    /// Loads the latest checkpoint for the thread (or the one given by `config.checkpoint_id`).
    /// `Ok(None)` when the thread has no checkpoints.
    async fn load(&self, config: &RunnableConfig) -> Result<Option<Checkpoint>, CheckpointError>;

    /// Lists checkpoints of the thread, newest first.
    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError>;

    /// Deletes every checkpoint of the thread.
    async fn clear(&self, thread_id: &str) -> Result<(), CheckpointError>;

    /// Claims the thread for one run. Fails with `SessionConflict` while another lease is alive.
    fn lease(&self, thread_id: &str) -> Result<ThreadLease, CheckpointError>;
}

pub(crate) fn require_thread_id(config: &RunnableConfig) -> Result<&str, CheckpointError> {
    config
        .thread_id
        .as_deref()
        .ok_or(CheckpointError::ThreadIdRequired)
}
