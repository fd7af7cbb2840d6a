//! Mock ToolSource for tests and examples.
//!
//! Returns a fixed tool list and fixed call results; records every call.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Mock tool source: fixed tool list and fixed call result.
///
/// `list_tools()` returns a configurable list; `call_tool(name, _)` returns the
/// per-tool result if one was set, else the default text. Unknown tools fail with
/// `NotFound`.
///
/// **Interaction**: Implements `ToolSource`; used by ToolNode tests and the chat graph tests.
pub struct MockToolSource {
    tools: Vec<ToolSpec>,
    call_result: String,
    results: HashMap<String, String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolSource {
    /// Creates a mock that lists one tool `get_time` and returns a fixed time string on call.
    pub fn get_time_example() -> Self {
        Self::new(
            vec![ToolSpec {
                name: "get_time".to_string(),
                description: Some("Get current time.".to_string()),
                input_schema: json!({ "type": "object", "properties": {} }),
            }],
            "2025-01-29 12:00:00".to_string(),
        )
    }

    /// Creates a mock with custom tool list and fixed call result.
    pub fn new(tools: Vec<ToolSpec>, call_result: String) -> Self {
        Self {
            tools,
            call_result,
            results: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the text returned for one tool (builder style).
    pub fn with_result(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.results.insert(name.into(), text.into());
        self
    }

    /// (name, arguments) of every call so far.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockToolSource {
    fn default() -> Self {
        Self::get_time_example()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        if !self.tools.iter().any(|t| t.name == name) {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), arguments));
        }
        let text = self
            .results
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.call_result.clone());
        Ok(ToolCallContent { text })
    }
}
