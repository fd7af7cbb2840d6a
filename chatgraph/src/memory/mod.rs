//! # Memory: checkpointed conversation state
//!
//! A [`Checkpointer`] persists the channel values of a run, keyed by conversation
//! (`thread_id`). The compiled graph loads the latest checkpoint before a run, merges
//! the caller's input on top of it, and saves a new checkpoint after every step.
//!
//! ## Config
//!
//! [`RunnableConfig`] is passed to `CompiledStateGraph::invoke`:
//! - `thread_id`: identifies the conversation. Without it nothing is loaded or saved.
//! - `checkpoint_id`: load a specific checkpoint instead of the latest (time travel).
//! - `recursion_limit`: maximum number of steps per run.
//! - `cancel`: token checked before each step.
//!
//! ## Checkpointer Implementations
//!
//! | Type             | Persistence | Use case                | Feature  |
//! |------------------|-------------|-------------------------|----------|
//! | [`MemorySaver`]  | In-memory   | Dev, tests              | -        |
//! | [`SqliteSaver`]  | SQLite file | Single-node, tutorials  | `sqlite` |
//!
//! Both hold [`ThreadLocks`], so a second concurrent run on the same thread is
//! rejected with `CheckpointError::SessionConflict`.

mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;
mod serializer;
mod thread_lock;

#[cfg(feature = "sqlite")]
mod sqlite_saver;

pub use checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::{RunnableConfig, DEFAULT_RECURSION_LIMIT};
pub use memory_saver::MemorySaver;
pub use serializer::{JsonSerializer, Serializer};
pub use thread_lock::{ThreadLease, ThreadLocks};

#[cfg(feature = "sqlite")]
pub use sqlite_saver::SqliteSaver;
