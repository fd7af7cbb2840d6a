//! Checkpoint and metadata types.
//!
//! A checkpoint is the full set of channel values after one step of a run, plus the
//! step number and where it came from.

use std::str::FromStr;
use std::time::{Duration, SystemTime};

use crate::state::Snapshot;

/// Metadata for a single checkpoint (source, step, created_at).
///
/// Used by Checkpointer implementations and by `list()` for history.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    /// Number of steps executed on the thread, across runs, when this was saved.
    pub step: u64,
    pub created_at: Option<SystemTime>,
}

/// Source of the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointSource {
    /// Saved by the executor after a step.
    Loop,
    /// Saved by `CompiledStateGraph::update_state` outside of a run.
    Update,
}

impl CheckpointSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointSource::Loop => "loop",
            CheckpointSource::Update => "update",
        }
    }
}

impl FromStr for CheckpointSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loop" => Ok(Self::Loop),
            "update" => Ok(Self::Update),
            other => Err(format!("unknown checkpoint source: {}", other)),
        }
    }
}

/// One checkpoint: channel values + id/ts + metadata.
///
/// Stored by Checkpointer keyed by (thread_id, checkpoint id).
///
/// **Interaction**: Produced by graph execution; consumed by `Checkpointer::save`,
/// returned by `Checkpointer::load`.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub id: String,
    /// Milliseconds since the Unix epoch, as a string.
    pub ts: String,
    pub channel_values: Snapshot,
    pub metadata: CheckpointMetadata,
}

/// Item returned by `Checkpointer::list` for history / time travel.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointListItem {
    pub checkpoint_id: String,
    pub metadata: CheckpointMetadata,
}

impl Checkpoint {
    /// Creates a checkpoint from the current channel values. Uses current time for ts.
    pub fn from_state(state: Snapshot, source: CheckpointSource, step: u64) -> Self {
        let now = SystemTime::now();
        let ts = format!(
            "{}",
            now.duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0)
        );
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ts,
            channel_values: state,
            metadata: CheckpointMetadata {
                source,
                step,
                created_at: Some(now),
            },
        }
    }

    /// Parses `ts` back into a time; `None` if it is not a millisecond count.
    pub fn created_at_from_ts(ts: &str) -> Option<SystemTime> {
        ts.parse::<u64>()
            .ok()
            .map(|ms| SystemTime::UNIX_EPOCH + Duration::from_millis(ms))
    }
}
