//! Unit tests for [`CalculatorToolSource`](crate::tools::CalculatorToolSource).

use chatgraph::{ToolSource, ToolSourceError};
use serde_json::json;

use crate::tools::CalculatorToolSource;

/// **Scenario**: The three tools are listed with a two-operand schema.
#[tokio::test]
async fn lists_add_multiply_divide() {
    let tools = CalculatorToolSource.list_tools().await.unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["add", "multiply", "divide"]);
    assert_eq!(tools[0].input_schema["required"], json!(["a", "b"]));
}

/// **Scenario**: Each operation computes its result as text.
#[tokio::test]
async fn computes_results() {
    let calc = CalculatorToolSource;
    let args = json!({"a": 6, "b": 4});
    assert_eq!(calc.call_tool("add", args.clone()).await.unwrap().text, "10");
    assert_eq!(calc.call_tool("multiply", args.clone()).await.unwrap().text, "24");
    assert_eq!(calc.call_tool("divide", args).await.unwrap().text, "1.5");
}

/// **Scenario**: Division by zero, missing operands and unknown tools are distinct errors.
#[tokio::test]
async fn reports_errors() {
    let calc = CalculatorToolSource;
    assert!(matches!(
        calc.call_tool("divide", json!({"a": 1, "b": 0})).await,
        Err(ToolSourceError::Execution(_))
    ));
    assert!(matches!(
        calc.call_tool("add", json!({"a": 1})).await,
        Err(ToolSourceError::InvalidInput(_))
    ));
    assert!(matches!(
        calc.call_tool("sqrt", json!({"a": 1, "b": 1})).await,
        Err(ToolSourceError::NotFound(_))
    ));
}
