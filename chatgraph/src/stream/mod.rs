//! Streaming types for graph runs.
//!
//! Defines stream modes and events for value, update and message streaming. Used by
//! `CompiledStateGraph::stream` and by nodes that emit incremental LLM output.

use crate::error::ErrorPayload;
use crate::state::{Snapshot, Update};

/// Stream mode selector: which kinds of events to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Emit the full snapshot after each step is merged.
    Values,
    /// Emit each node's partial update with its node id.
    Updates,
    /// Emit message chunks (LLM streaming).
    Messages,
}

/// Metadata attached to streamed messages.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamMetadata {
    /// Graph node id that produced the message.
    pub node_id: String,
}

/// One chunk of streamed message content.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageChunk {
    pub content: String,
}

/// Streamed event emitted while running a graph.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    /// Full snapshot after a step is merged.
    Values(Snapshot),
    /// Partial update returned by one node of the step, in registration order.
    Updates { node_id: String, update: Update },
    /// Message chunk emitted by a node (e.g. ChatNode streaming LLM output).
    Messages {
        chunk: MessageChunk,
        metadata: StreamMetadata,
    },
    /// Terminal event when the run fails; always the last event of the stream.
    Error(ErrorPayload),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashSet;

    /// **Scenario**: StreamEvent variants carry expected data.
    #[test]
    fn stream_event_variants_hold_data() {
        let updates = StreamEvent::Updates {
            node_id: "n1".into(),
            update: Update::new().set("counter", 2),
        };
        match updates {
            StreamEvent::Updates { node_id, update } => {
                assert_eq!(node_id, "n1");
                assert_eq!(update.get("counter"), Some(&serde_json::json!(2)));
            }
            _ => panic!("expected Updates variant"),
        }

        let messages = StreamEvent::Messages {
            chunk: MessageChunk {
                content: "hi".into(),
            },
            metadata: StreamMetadata {
                node_id: "chat".into(),
            },
        };
        match messages {
            StreamEvent::Messages { chunk, metadata } => {
                assert_eq!(chunk.content, "hi");
                assert_eq!(metadata.node_id, "chat");
            }
            _ => panic!("expected Messages variant"),
        }

        let error = StreamEvent::Error(ErrorPayload {
            kind: ErrorKind::Cancelled,
            node: None,
            message: "run cancelled".into(),
        });
        assert!(matches!(error, StreamEvent::Error(p) if p.kind == ErrorKind::Cancelled));
    }

    /// **Scenario**: StreamMode is usable as a set member.
    #[test]
    fn stream_mode_hash_set() {
        let modes: HashSet<StreamMode> =
            HashSet::from_iter([StreamMode::Values, StreamMode::Values, StreamMode::Messages]);
        assert_eq!(modes.len(), 2);
        assert!(!modes.contains(&StreamMode::Updates));
    }
}
