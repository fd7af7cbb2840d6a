//! Run context passed into nodes for streaming-aware execution.
//!
//! Holds the runnable config, the id of the node being run, and the optional stream
//! sender plus selected stream modes.

use std::collections::HashSet;

use tokio::sync::mpsc;

use crate::memory::RunnableConfig;
use crate::stream::{MessageChunk, StreamEvent, StreamMetadata, StreamMode};

#[derive(Clone, Debug)]
pub struct RunContext {
    /// Node currently running; empty at run level.
    pub node_id: String,
    /// Config for the current run (thread_id, checkpoint, limits).
    pub config: RunnableConfig,
    /// Optional sender for streaming events.
    pub stream_tx: Option<mpsc::Sender<StreamEvent>>,
    /// Enabled stream modes.
    pub stream_mode: HashSet<StreamMode>,
}

impl RunContext {
    pub fn new(
        config: RunnableConfig,
        stream_tx: Option<mpsc::Sender<StreamEvent>>,
        stream_mode: HashSet<StreamMode>,
    ) -> Self {
        Self {
            node_id: String::new(),
            config,
            stream_tx,
            stream_mode,
        }
    }

    /// Copy of this context scoped to one node.
    pub fn for_node(&self, node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            ..self.clone()
        }
    }

    pub fn wants(&self, mode: StreamMode) -> bool {
        self.stream_tx.is_some() && self.stream_mode.contains(&mode)
    }

    /// Sends an event; a closed receiver is ignored (the consumer stopped listening).
    pub async fn emit(&self, event: StreamEvent) {
        if let Some(tx) = &self.stream_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Emits a `Messages` chunk for the current node when `StreamMode::Messages` is on.
    pub async fn emit_message_chunk(&self, content: impl Into<String>) {
        if self.wants(StreamMode::Messages) {
            self.emit(StreamEvent::Messages {
                chunk: MessageChunk {
                    content: content.into(),
                },
                metadata: StreamMetadata {
                    node_id: self.node_id.clone(),
                },
            })
            .await;
        }
    }
}
