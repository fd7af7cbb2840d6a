//! Prebuilt chat agent: chat node, tool node, routing and runner.
//!
//! The graph alternates between the model and the tools until the model answers
//! without tool calls:
//!
//! ```text
//! START -> chat -> tools_condition -> tools -> chat -> ... -> END
//! ```

mod chat_node;
mod condition;
mod runner;
mod tool_node;

pub use chat_node::ChatNode;
pub use condition::{tools_condition, CHAT_NODE, TOOLS_NODE};
pub use runner::{chat_graph, ChatRunner, RunError};
pub use tool_node::{ErrorHandlerFn, HandleToolErrors, ToolNode, DEFAULT_TOOL_ERROR_TEMPLATE};
