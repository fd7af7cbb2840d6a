//! Tool source abstraction: list tools and call a tool.
//!
//! ToolNode uses a ToolSource to execute the tool calls of the last assistant
//! message; the chat model gets the specs from `list_tools()`.

mod mock;

pub use mock::MockToolSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool specification: name, description and JSON Schema for arguments.
///
/// **Interaction**: Returned by `ToolSource::list_tools()`; handed to the LLM client
/// (e.g. `ChatOpenAI::with_tools`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name, as the model will call it.
    pub name: String,
    /// Human-readable description for the LLM.
    pub description: Option<String>,
    /// JSON Schema for arguments.
    pub input_schema: Value,
}

/// Result of a single tool call.
///
/// **Interaction**: Returned by `ToolSource::call_tool()`; ToolNode turns it into a
/// `tool` message answering the call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallContent {
    pub text: String,
}

/// Error from listing or calling tools.
#[derive(Debug, thiserror::Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("tool failed: {0}")]
    Execution(String),
}

/// Tool source: list tools and call a tool.
///
/// Implementations: `MockToolSource` (fixed list and results); the CLI ships a
/// calculator source.
///
/// **Interaction**: Used by `ToolNode` and by `ChatRunner` to configure the model's tools.
#[async_trait]
pub trait ToolSource: Send + Sync {
    /// List available tools.
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    /// Call a tool by name with JSON arguments.
    async fn call_tool(&self, name: &str, arguments: Value)
        -> Result<ToolCallContent, ToolSourceError>;
}
