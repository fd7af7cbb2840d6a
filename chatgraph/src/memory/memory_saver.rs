//! In-memory checkpointer (MemorySaver). Not persistent.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem};
use crate::memory::checkpointer::{require_thread_id, CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;
use crate::memory::thread_lock::{ThreadLease, ThreadLocks};

/// In-memory checkpointer. Key: thread_id; value: checkpoints in save order.
///
/// For dev and tests; state is lost when the process exits.
///
/// **Interaction**: Used as `Arc<dyn Checkpointer>` in `StateGraph::compile_with_checkpointer`.
#[derive(Default)]
pub struct MemorySaver {
    threads: RwLock<HashMap<String, Vec<Checkpoint>>>,
    locks: ThreadLocks,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Checkpointer for MemorySaver {
    async fn save(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint,
    ) -> Result<String, CheckpointError> {
        let thread_id = require_thread_id(config)?;
        let mut threads = self.threads.write().await;
        threads
            .entry(thread_id.to_string())
            .or_default()
            .push(checkpoint.clone());
        Ok(checkpoint.id.clone())
    }

    async fn load(&self, config: &RunnableConfig) -> Result<Option<Checkpoint>, CheckpointError> {
        let thread_id = require_thread_id(config)?;
        let threads = self.threads.read().await;
        let Some(history) = threads.get(thread_id) else {
            return match &config.checkpoint_id {
                Some(id) => Err(CheckpointError::NotFound(id.clone())),
                None => Ok(None),
            };
        };
        match &config.checkpoint_id {
            Some(id) => history
                .iter()
                .find(|cp| &cp.id == id)
                .cloned()
                .map(Some)
                .ok_or_else(|| CheckpointError::NotFound(id.clone())),
            None => Ok(history.last().cloned()),
        }
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let thread_id = require_thread_id(config)?;
        let threads = self.threads.read().await;
        let items = threads
            .get(thread_id)
            .map(|history| {
                history
                    .iter()
                    .rev()
                    .take(limit.unwrap_or(usize::MAX))
                    .map(|cp| CheckpointListItem {
                        checkpoint_id: cp.id.clone(),
                        metadata: cp.metadata.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(items)
    }

    async fn clear(&self, thread_id: &str) -> Result<(), CheckpointError> {
        self.threads.write().await.remove(thread_id);
        Ok(())
    }

    fn lease(&self, thread_id: &str) -> Result<ThreadLease, CheckpointError> {
        self.locks.try_acquire(thread_id)
    }
}
