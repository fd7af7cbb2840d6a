//! Per-thread run leases.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::memory::checkpointer::CheckpointError;

/// Set of threads that currently have a run in progress.
///
/// Cloning shares the set. Checkpointers hold one and hand out [`ThreadLease`]s.
#[derive(Debug, Clone, Default)]
pub struct ThreadLocks {
    active: Arc<DashMap<String, ()>>,
}

impl ThreadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `thread_id` until the returned lease is dropped.
    pub fn try_acquire(&self, thread_id: &str) -> Result<ThreadLease, CheckpointError> {
        match self.active.entry(thread_id.to_string()) {
            Entry::Occupied(_) => Err(CheckpointError::SessionConflict(thread_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(ThreadLease {
                    active: Arc::clone(&self.active),
                    thread_id: thread_id.to_string(),
                })
            }
        }
    }

    pub fn is_held(&self, thread_id: &str) -> bool {
        self.active.contains_key(thread_id)
    }
}

/// Exclusive claim on a thread; released on drop.
#[derive(Debug)]
pub struct ThreadLease {
    active: Arc<DashMap<String, ()>>,
    thread_id: String,
}

impl ThreadLease {
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }
}

impl Drop for ThreadLease {
    fn drop(&mut self) {
        self.active.remove(&self.thread_id);
    }
}
