//! Calculator tool source: add, multiply, divide over two numbers.
//!
//! Implements [`ToolSource`](chatgraph::ToolSource); used by [`run_chat`](crate::run_chat)
//! so the model has something to call.

use chatgraph::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
use serde_json::{json, Value};

/// Calculator tool source. Every tool takes `{"a": number, "b": number}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorToolSource;

fn binary_spec(name: &str, description: &str) -> ToolSpec {
    ToolSpec {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "a": { "type": "number", "description": "First operand" },
                "b": { "type": "number", "description": "Second operand" }
            },
            "required": ["a", "b"]
        }),
    }
}

fn operand(arguments: &Value, key: &str) -> Result<f64, ToolSourceError> {
    arguments
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolSourceError::InvalidInput(format!("missing number '{}'", key)))
}

#[async_trait::async_trait]
impl ToolSource for CalculatorToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(vec![
            binary_spec("add", "Add two numbers."),
            binary_spec("multiply", "Multiply two numbers."),
            binary_spec("divide", "Divide a by b."),
        ])
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        if !matches!(name, "add" | "multiply" | "divide") {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        let a = operand(&arguments, "a")?;
        let b = operand(&arguments, "b")?;
        let result = match name {
            "add" => a + b,
            "multiply" => a * b,
            _ => {
                if b == 0.0 {
                    return Err(ToolSourceError::Execution("division by zero".to_string()));
                }
                a / b
            }
        };
        Ok(ToolCallContent {
            text: result.to_string(),
        })
    }
}
