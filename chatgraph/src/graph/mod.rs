//! State graph: channels, nodes, fixed and conditional edges; compile and run.
//!
//! Aligns with LangGraph `StateGraph`: declare channels, add nodes and edges,
//! compile, then invoke or stream with a partial initial update.

mod compile_error;
mod compiled;
mod logging;
mod next;
mod node;
mod node_middleware;
mod router;
mod run_context;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use next::Next;
pub use node::{FnNode, Node};
pub use node_middleware::{LoggingNodeMiddleware, NodeCall, NodeFuture, NodeMiddleware};
pub use router::Router;
pub use run_context::RunContext;
pub use state_graph::{StateGraph, END, START};
