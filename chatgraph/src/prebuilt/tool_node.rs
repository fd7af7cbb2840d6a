//! Tool node: execute the tool calls of the last assistant message.
//!
//! Each call is answered by one `tool` message carrying the call id, appended in
//! call order.
//!
//! # Error Handling
//!
//! - `HandleToolErrors::Never` - a failing call fails the node (and the run)
//! - `HandleToolErrors::Always` - the error becomes the text of the tool message (default)
//! - `HandleToolErrors::Custom(handler)` - the handler builds the tool message text

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::Node;
use crate::message::{Message, ToolCall};
use crate::state::{Snapshot, Update, MESSAGES_KEY};
use crate::tool_source::{ToolSource, ToolSourceError};

/// Default text for a failed call: tool name, arguments and error.
pub const DEFAULT_TOOL_ERROR_TEMPLATE: &str =
    "Error executing tool '{tool_name}' with arguments {tool_args}: {error}. Please fix the error and try again.";

/// Builds the tool message text for a failed call from the error, tool name and arguments.
pub type ErrorHandlerFn = Arc<dyn Fn(&ToolSourceError, &str, &Value) -> String + Send + Sync>;

/// How ToolNode treats a failing tool call.
#[derive(Clone)]
pub enum HandleToolErrors {
    /// The error fails the node.
    Never,
    /// The error is reported to the model; `None` uses [`DEFAULT_TOOL_ERROR_TEMPLATE`].
    Always(Option<String>),
    Custom(ErrorHandlerFn),
}

impl Default for HandleToolErrors {
    fn default() -> Self {
        Self::Always(None)
    }
}

impl std::fmt::Debug for HandleToolErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => write!(f, "HandleToolErrors::Never"),
            Self::Always(msg) => write!(f, "HandleToolErrors::Always({:?})", msg),
            Self::Custom(_) => write!(f, "HandleToolErrors::Custom(<fn>)"),
        }
    }
}

fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Tool node: runs every tool call requested by the last assistant message.
///
/// Arguments arrive as a JSON string; an empty string reads as `{}`. Unparseable
/// arguments are reported as `ToolSourceError::InvalidInput`.
///
/// **Interaction**: Implements `Node`; used by `chat_graph` after `tools_condition`.
/// Consumes `ToolSource` (e.g. MockToolSource or the CLI calculator).
pub struct ToolNode {
    tools: Arc<dyn ToolSource>,
    handle_tool_errors: HandleToolErrors,
    messages_key: String,
}

impl ToolNode {
    pub fn new(tools: Arc<dyn ToolSource>) -> Self {
        Self {
            tools,
            handle_tool_errors: HandleToolErrors::default(),
            messages_key: MESSAGES_KEY.to_string(),
        }
    }

    pub fn with_handle_tool_errors(mut self, handle_tool_errors: HandleToolErrors) -> Self {
        self.handle_tool_errors = handle_tool_errors;
        self
    }

    pub fn with_messages_key(mut self, key: impl Into<String>) -> Self {
        self.messages_key = key.into();
        self
    }

    fn handle_error(&self, error: &ToolSourceError, tool_name: &str, args: &Value) -> Option<String> {
        match &self.handle_tool_errors {
            HandleToolErrors::Never => None,
            HandleToolErrors::Always(custom) => Some(custom.clone().unwrap_or_else(|| {
                DEFAULT_TOOL_ERROR_TEMPLATE
                    .replace("{tool_name}", tool_name)
                    .replace("{tool_args}", &args.to_string())
                    .replace("{error}", &error.to_string())
            })),
            HandleToolErrors::Custom(handler) => Some(handler(error, tool_name, args)),
        }
    }

    async fn execute(&self, call: &ToolCall) -> Result<String, AgentError> {
        let parsed = if call.arguments.trim().is_empty() {
            Ok(Value::Object(Default::default()))
        } else {
            serde_json::from_str::<Value>(&call.arguments)
                .map_err(|e| ToolSourceError::InvalidInput(e.to_string()))
        };
        let (args, result) = match parsed {
            Ok(args) => {
                let result = self.tools.call_tool(&call.name, args.clone()).await;
                (args, result.map(|content| content.text))
            }
            Err(e) => (Value::String(call.arguments.clone()), Err(e)),
        };

        match result {
            Ok(text) => {
                debug!(tool = %call.name, result = %truncate_for_log(&text, 200), "tool call ok");
                Ok(text)
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool call failed");
                self.handle_error(&e, &call.name, &args).ok_or_else(|| {
                    AgentError::ExecutionFailed(format!("tool '{}': {}", call.name, e))
                })
            }
        }
    }
}

#[async_trait]
impl Node for ToolNode {
    async fn run(&self, state: &Snapshot) -> Result<Update, AgentError> {
        let messages = state.messages_in(&self.messages_key)?;
        let calls = messages
            .last()
            .map(|m| m.tool_calls().to_vec())
            .unwrap_or_default();

        let mut replies = Vec::with_capacity(calls.len());
        for call in &calls {
            let text = self.execute(call).await?;
            replies.push(
                Message::tool(call.id.as_str(), text).with_id(uuid::Uuid::new_v4().to_string()),
            );
        }
        Update::new().with_messages(self.messages_key.as_str(), replies)
    }
}
