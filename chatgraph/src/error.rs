//! Error types for node execution and graph runs.
//!
//! [`AgentError`] is what a single node returns when its step fails (LLM call,
//! tool call, malformed state). [`GraphError`] is what a run returns: it wraps
//! node failures with the failing node's name and adds the executor's own
//! failure kinds (unknown channel/node, conflicting writes, session conflicts).

use serde::Serialize;
use thiserror::Error;

use crate::channels::ChannelError;
use crate::memory::CheckpointError;

/// Node execution error.
///
/// Returned by `Node::run` when a step fails. The executor attaches the node
/// name and surfaces it as [`GraphError::NodeExecution`].
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, tool error).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The node expected a channel in the snapshot that is not there.
    #[error("missing state channel: {0}")]
    MissingChannel(String),

    /// A channel value could not be converted to or from the node's type.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error returned by a graph run (`invoke`, `stream`, `update_state`).
///
/// Every variant aborts the run. State merged in earlier steps stays valid (and
/// persisted when a checkpointer is attached); nothing from the failing step is applied.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An update or the initial state referenced a channel that was never declared.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    /// The router of `from` returned `target`, which is not registered (or not among
    /// its declared targets).
    #[error("node '{from}' routed to unknown node '{target}'")]
    UnknownNode { from: String, target: String },

    /// Two nodes of the same step wrote one overwrite channel.
    #[error("concurrent write to overwrite channel '{channel}' by nodes {nodes:?}")]
    ConcurrentWriteConflict { channel: String, nodes: Vec<String> },

    /// A reducer rejected the shape of an update.
    #[error("invalid update for channel '{channel}': {reason}")]
    InvalidUpdate { channel: String, reason: String },

    /// A node function failed.
    #[error("node '{node}' failed: {source}")]
    NodeExecution {
        node: String,
        #[source]
        source: AgentError,
    },

    /// Another run holds the same conversation thread.
    #[error("thread '{0}' already has a run in progress")]
    ConcurrentSessionConflict(String),

    /// The run did not terminate within the configured number of steps.
    #[error("recursion limit of {0} steps reached")]
    RecursionLimit(usize),

    /// The run's cancellation token fired before the next step was dispatched.
    #[error("run cancelled")]
    Cancelled,

    /// Loading or saving a checkpoint failed.
    #[error("checkpoint error: {0}")]
    Checkpoint(CheckpointError),
}

impl From<ChannelError> for GraphError {
    fn from(e: ChannelError) -> Self {
        match e {
            ChannelError::UnknownChannel(key) => GraphError::UnknownChannel(key),
            ChannelError::ConcurrentWriteConflict { channel, nodes } => {
                GraphError::ConcurrentWriteConflict { channel, nodes }
            }
            ChannelError::InvalidUpdate { channel, reason } => {
                GraphError::InvalidUpdate { channel, reason }
            }
        }
    }
}

impl From<CheckpointError> for GraphError {
    fn from(e: CheckpointError) -> Self {
        match e {
            CheckpointError::SessionConflict(thread_id) => {
                GraphError::ConcurrentSessionConflict(thread_id)
            }
            other => GraphError::Checkpoint(other),
        }
    }
}

/// Taxonomy kind of a [`GraphError`], stable across versions and safe to show to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownChannel,
    UnknownNode,
    ConcurrentWriteConflict,
    InvalidUpdate,
    NodeExecution,
    ConcurrentSessionConflict,
    RecursionLimit,
    Cancelled,
    Checkpoint,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownChannel => "unknown_channel",
            ErrorKind::UnknownNode => "unknown_node",
            ErrorKind::ConcurrentWriteConflict => "concurrent_write_conflict",
            ErrorKind::InvalidUpdate => "invalid_update",
            ErrorKind::NodeExecution => "node_execution",
            ErrorKind::ConcurrentSessionConflict => "concurrent_session_conflict",
            ErrorKind::RecursionLimit => "recursion_limit",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Checkpoint => "checkpoint",
        }
    }

    /// Client-facing description; never includes upstream error text.
    fn public_message(&self) -> &'static str {
        match self {
            ErrorKind::UnknownChannel => "the run referenced an undeclared state channel",
            ErrorKind::UnknownNode => "the run routed to an unregistered node",
            ErrorKind::ConcurrentWriteConflict => {
                "two nodes wrote the same overwrite channel in one step"
            }
            ErrorKind::InvalidUpdate => "a node produced an update the channel cannot merge",
            ErrorKind::NodeExecution => "a node failed while executing",
            ErrorKind::ConcurrentSessionConflict => {
                "another run is already in progress for this thread"
            }
            ErrorKind::RecursionLimit => "the run exceeded its step limit",
            ErrorKind::Cancelled => "the run was cancelled",
            ErrorKind::Checkpoint => "conversation state could not be loaded or saved",
        }
    }
}

/// Structured, serializable view of a [`GraphError`] for HTTP bodies and stream events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    pub message: String,
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::UnknownChannel(_) => ErrorKind::UnknownChannel,
            GraphError::UnknownNode { .. } => ErrorKind::UnknownNode,
            GraphError::ConcurrentWriteConflict { .. } => ErrorKind::ConcurrentWriteConflict,
            GraphError::InvalidUpdate { .. } => ErrorKind::InvalidUpdate,
            GraphError::NodeExecution { .. } => ErrorKind::NodeExecution,
            GraphError::ConcurrentSessionConflict(_) => ErrorKind::ConcurrentSessionConflict,
            GraphError::RecursionLimit(_) => ErrorKind::RecursionLimit,
            GraphError::Cancelled => ErrorKind::Cancelled,
            GraphError::Checkpoint(_) => ErrorKind::Checkpoint,
        }
    }

    /// Name of the failing node, when the error is attributable to one.
    pub fn node(&self) -> Option<&str> {
        match self {
            GraphError::NodeExecution { node, .. } => Some(node),
            GraphError::UnknownNode { from, .. } => Some(from),
            _ => None,
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        let kind = self.kind();
        ErrorPayload {
            kind,
            node: self.node().map(str::to_string),
            message: kind.public_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display format of ExecutionFailed contains "execution failed" and the message.
    #[test]
    fn agent_error_display_execution_failed() {
        let err = AgentError::ExecutionFailed("msg".to_string());
        let s = err.to_string();
        assert!(s.contains("execution failed"), "{}", s);
        assert!(s.contains("msg"), "{}", s);
    }

    /// **Scenario**: NodeExecution display names the node and keeps the source error reachable.
    #[test]
    fn node_execution_display_and_source() {
        let err = GraphError::NodeExecution {
            node: "chat".into(),
            source: AgentError::ExecutionFailed("upstream 500".into()),
        };
        assert!(err.to_string().contains("'chat'"));
        let source = std::error::Error::source(&err).expect("has source");
        assert!(source.to_string().contains("upstream 500"));
    }

    /// **Scenario**: The payload carries kind and node but not the upstream error text.
    #[test]
    fn payload_does_not_leak_source_message() {
        let err = GraphError::NodeExecution {
            node: "chat".into(),
            source: AgentError::ExecutionFailed("secret api key rejected".into()),
        };
        let payload = err.to_payload();
        assert_eq!(payload.kind, ErrorKind::NodeExecution);
        assert_eq!(payload.node.as_deref(), Some("chat"));
        assert!(!payload.message.contains("secret"));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "node_execution");
    }

    /// **Scenario**: A checkpoint session conflict converts to the session-conflict graph error.
    #[test]
    fn session_conflict_maps_to_graph_kind() {
        let err: GraphError = CheckpointError::SessionConflict("t1".into()).into();
        assert_eq!(err.kind(), ErrorKind::ConcurrentSessionConflict);
        let err: GraphError = CheckpointError::Storage("disk".into()).into();
        assert_eq!(err.kind(), ErrorKind::Checkpoint);
    }

    /// **Scenario**: Channel errors keep their taxonomy after conversion.
    #[test]
    fn channel_errors_map_to_graph_kinds() {
        let err: GraphError = ChannelError::UnknownChannel("nope".into()).into();
        assert!(matches!(err, GraphError::UnknownChannel(ref k) if k == "nope"));
        let err: GraphError = ChannelError::ConcurrentWriteConflict {
            channel: "counter".into(),
            nodes: vec!["a".into(), "b".into()],
        }
        .into();
        assert_eq!(err.kind().as_str(), "concurrent_write_conflict");
    }
}
