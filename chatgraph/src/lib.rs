//! # chatgraph
//!
//! A LangGraph-style state-graph executor in Rust. A graph declares named **channels**,
//! each with a reducer that merges updates; **nodes** read a snapshot of all channels
//! and return a partial update; fixed and conditional **edges** pick the next step.
//! Nodes of one step run concurrently and their updates merge atomically.
//!
//! ## Design Principles
//!
//! - **Channels, not a state struct**: a snapshot is a map of channel name to JSON value;
//!   each channel's reducer (`LastValue`, `Append`, `AddMessages`, or a closure) decides
//!   how writes combine.
//! - **Partial updates**: nodes return only the channels they write. Two nodes writing
//!   the same overwrite channel in one step is a `ConcurrentWriteConflict`.
//! - **Checkpoint per step**: with a checkpointer and a `thread_id`, the merged state is
//!   saved after every step and the next run on the thread resumes from it.
//!
//! ## Main Modules
//!
//! - [`channels`]: `Channel`, reducers and the `ChannelStore` that applies steps.
//! - [`graph`]: `StateGraph`, `CompiledStateGraph`, `Node`, `Router`, `Next`.
//! - [`memory`]: `Checkpointer`, `MemorySaver`, `SqliteSaver`, `RunnableConfig`.
//! - [`message`]: chat `Message` and the `add_messages` merge.
//! - [`llm`]: `LlmClient` trait, `MockLlm`, and `ChatOpenAI` (feature `openai`).
//! - [`tool_source`]: `ToolSource` trait and `MockToolSource`.
//! - [`prebuilt`]: chat/tool nodes, `tools_condition` and `ChatRunner`.
//! - [`stream`]: stream modes and events.
//!
//! ## Features
//!
//! - `sqlite` (default): persistent `SqliteSaver`.
//! - `openai`: `ChatOpenAI` via `async-openai`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatgraph::{Channel, StateGraph, Update, END, START};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = StateGraph::new([Channel::last_value("counter", 0)]);
//! graph
//!     .add_fn_node("inc", |s| async move {
//!         let n: i64 = s.get_as("counter")?;
//!         Ok::<_, chatgraph::AgentError>(Update::new().set("counter", n + 1))
//!     })
//!     .add_edge(START, "inc")
//!     .add_edge("inc", END);
//!
//! let out = graph.compile()?.invoke(Update::new(), None).await?;
//! assert_eq!(out.get("counter"), Some(&serde_json::json!(1)));
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod prebuilt;
pub mod state;
pub mod stream;
pub mod tool_source;

pub use channels::{Channel, ChannelError, Reducer};
pub use error::{AgentError, ErrorKind, ErrorPayload, GraphError};
pub use graph::{
    CompilationError, CompiledStateGraph, Next, Node, NodeMiddleware, Router, RunContext,
    StateGraph, END, START,
};
#[cfg(feature = "openai")]
pub use llm::ChatOpenAI;
pub use llm::{LlmClient, LlmResponse, MockLlm, ToolChoiceMode};
pub use memory::{
    Checkpoint, CheckpointError, CheckpointListItem, CheckpointMetadata, CheckpointSource,
    Checkpointer, MemorySaver, RunnableConfig,
};
#[cfg(feature = "sqlite")]
pub use memory::SqliteSaver;
pub use message::{Message, MessageUpdate, RemoveMessage, Role, ToolCall, REMOVE_ALL_MESSAGES};
pub use prebuilt::{ChatNode, ChatRunner, RunError, ToolNode};
pub use state::{Snapshot, Update, MESSAGES_KEY};
pub use stream::{StreamEvent, StreamMode};
pub use tool_source::{MockToolSource, ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
