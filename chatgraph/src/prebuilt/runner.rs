//! Chat graph builder and runner.
//!
//! `chat_graph` wires START -> chat -> (tools_condition) -> tools -> chat over a
//! single `messages` channel. `ChatRunner` compiles it (optionally with a
//! checkpointer and node logging) and runs one user turn at a time.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::channels::Channel;
use crate::error::{AgentError, ErrorPayload, GraphError};
use crate::graph::{
    CompilationError, CompiledStateGraph, LoggingNodeMiddleware, StateGraph, END, START,
};
use crate::llm::LlmClient;
use crate::memory::{Checkpointer, RunnableConfig};
use crate::message::Message;
use crate::prebuilt::chat_node::ChatNode;
use crate::prebuilt::condition::{tools_condition, CHAT_NODE, TOOLS_NODE};
use crate::prebuilt::tool_node::ToolNode;
use crate::state::{Snapshot, Update, MESSAGES_KEY};
use crate::stream::{StreamEvent, StreamMode};
use crate::tool_source::ToolSource;

/// Error type for ChatRunner invoke/stream operations.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("invalid input: {0}")]
    Input(#[from] AgentError),
    /// The streamed run ended with an error event.
    #[error("run failed ({}): {}", .0.kind.as_str(), .0.message)]
    Failed(ErrorPayload),
    #[error("stream ended without final state")]
    StreamEndedWithoutState,
}

/// Builds the chat graph. Without a tool source the graph is START -> chat -> END.
pub fn chat_graph(
    llm: Arc<dyn LlmClient>,
    tools: Option<Arc<dyn ToolSource>>,
    system_prompt: Option<String>,
) -> StateGraph {
    let mut chat = ChatNode::new(llm);
    if let Some(prompt) = system_prompt {
        chat = chat.with_system_prompt(prompt);
    }

    let mut graph = StateGraph::new([Channel::messages(MESSAGES_KEY)]);
    graph.add_node(CHAT_NODE, Arc::new(chat)).add_edge(START, CHAT_NODE);
    match tools {
        Some(tools) => {
            graph
                .add_node(TOOLS_NODE, Arc::new(ToolNode::new(tools)))
                .add_conditional_edges_to(CHAT_NODE, tools_condition, [TOOLS_NODE, END])
                .add_edge(TOOLS_NODE, CHAT_NODE);
        }
        None => {
            graph.add_edge(CHAT_NODE, END);
        }
    }
    graph
}

/// Chat graph runner: compiled graph plus the default config for each turn.
///
/// Each call sends one human message. With a checkpointer and a thread id the
/// message is merged onto the thread's history, so conversations continue across
/// calls (and across processes with `SqliteSaver`).
///
/// # Example
///
/// ```ignore
/// let runner = ChatRunner::new(llm, Some(tools), Some(checkpointer), None, false)?;
/// let state = runner.invoke("What is 2 + 3?", Some(RunnableConfig::for_thread("t1"))).await?;
/// ```
pub struct ChatRunner {
    compiled: CompiledStateGraph,
}

impl ChatRunner {
    /// Creates a runner. When `verbose` is true every node call is logged through
    /// `LoggingNodeMiddleware`.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Option<Arc<dyn ToolSource>>,
        checkpointer: Option<Arc<dyn Checkpointer>>,
        system_prompt: Option<String>,
        verbose: bool,
    ) -> Result<Self, CompilationError> {
        let mut graph = chat_graph(llm, tools, system_prompt);
        if verbose {
            graph.with_middleware(Arc::new(LoggingNodeMiddleware));
        }
        let compiled = match checkpointer {
            Some(cp) => graph.compile_with_checkpointer(cp)?,
            None => graph.compile()?,
        };
        Ok(Self { compiled })
    }

    /// The compiled graph, e.g. for `get_state` / `get_state_history`.
    pub fn graph(&self) -> &CompiledStateGraph {
        &self.compiled
    }

    fn turn(user_message: &str) -> Result<Update, AgentError> {
        Update::messages([Message::human(user_message).with_id(uuid::Uuid::new_v4().to_string())])
    }

    /// Runs one turn to completion and returns the final snapshot.
    pub async fn invoke(
        &self,
        user_message: &str,
        config: Option<RunnableConfig>,
    ) -> Result<Snapshot, RunError> {
        let initial = Self::turn(user_message)?;
        Ok(self.compiled.invoke(initial, config).await?)
    }

    /// Streams one turn with all stream modes on (values, updates, message chunks).
    pub fn stream(
        &self,
        user_message: &str,
        config: Option<RunnableConfig>,
    ) -> Result<ReceiverStream<StreamEvent>, RunError> {
        let initial = Self::turn(user_message)?;
        let modes = HashSet::from([StreamMode::Values, StreamMode::Updates, StreamMode::Messages]);
        Ok(self.compiled.stream(initial, config, modes))
    }

    /// Streams one turn, passing every event to `on_event`; returns the snapshot of
    /// the last `Values` event.
    pub async fn stream_with_callback<F>(
        &self,
        user_message: &str,
        config: Option<RunnableConfig>,
        mut on_event: Option<F>,
    ) -> Result<Snapshot, RunError>
    where
        F: FnMut(&StreamEvent),
    {
        let mut stream = self.stream(user_message, config)?;
        let mut final_state: Option<Snapshot> = None;
        while let Some(event) = stream.next().await {
            if let Some(ref mut f) = on_event {
                f(&event);
            }
            match event {
                StreamEvent::Values(s) => final_state = Some(s),
                StreamEvent::Error(payload) => return Err(RunError::Failed(payload)),
                _ => {}
            }
        }
        final_state.ok_or(RunError::StreamEndedWithoutState)
    }
}
