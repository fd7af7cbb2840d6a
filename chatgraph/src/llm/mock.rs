//! Mock LLM for tests and examples.
//!
//! Returns scripted responses in order; the last one repeats once the script is
//! exhausted. Records the messages of every call so tests can assert on prompts.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::{Message, ToolCall};

/// Mock LLM: scripted assistant text and tool_calls.
///
/// `with_no_tool_calls` answers directly (chat -> END); `first_tool_then_answer`
/// requests one tool call and answers on the next turn (chat -> tools -> chat -> END).
/// `failing` returns an error on every call.
///
/// **Interaction**: Implements `LlmClient`; used by ChatNode in tests and the CLI/server tests.
pub struct MockLlm {
    script: Vec<LlmResponse>,
    fail_with: Option<String>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Responses returned in order; the last one repeats.
    pub fn scripted(script: Vec<LlmResponse>) -> Self {
        Self {
            script,
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Build a mock that returns assistant text and no tool_calls (END path).
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::scripted(vec![LlmResponse {
            content: content.into(),
            tool_calls: vec![],
        }])
    }

    /// First call requests `tool_call`; later calls answer with `answer`.
    pub fn first_tool_then_answer(tool_call: ToolCall, answer: impl Into<String>) -> Self {
        Self::scripted(vec![
            LlmResponse {
                content: String::new(),
                tool_calls: vec![tool_call],
            },
            LlmResponse {
                content: answer.into(),
                tool_calls: vec![],
            },
        ])
    }

    /// Every call fails with `AgentError::ExecutionFailed(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Vec::new(),
            fail_with: Some(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Messages passed to each call so far.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let n = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| AgentError::ExecutionFailed("mock llm lock poisoned".into()))?;
            calls.push(messages.to_vec());
            calls.len() - 1
        };
        if let Some(message) = &self.fail_with {
            return Err(AgentError::ExecutionFailed(message.clone()));
        }
        self.script
            .get(n)
            .or_else(|| self.script.last())
            .cloned()
            .ok_or_else(|| AgentError::ExecutionFailed("mock llm has no responses".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Scripted responses are returned in order and the last one repeats.
    #[tokio::test]
    async fn scripted_in_order_then_repeat_last() {
        let call = ToolCall {
            id: "call-1".into(),
            name: "add".into(),
            arguments: r#"{"a":1,"b":2}"#.into(),
        };
        let llm = MockLlm::first_tool_then_answer(call.clone(), "3");
        let msgs = [Message::human("1+2?")];
        assert_eq!(llm.invoke(&msgs).await.unwrap().tool_calls, vec![call]);
        assert_eq!(llm.invoke(&msgs).await.unwrap().content, "3");
        assert_eq!(llm.invoke(&msgs).await.unwrap().content, "3");
        assert_eq!(llm.call_count(), 3);
        assert_eq!(llm.calls()[0], msgs.to_vec());
    }

    /// **Scenario**: failing() errors on every call but still records the prompt.
    #[tokio::test]
    async fn failing_mock_errors() {
        let llm = MockLlm::failing("rate limited");
        match llm.invoke(&[Message::human("hi")]).await {
            Err(AgentError::ExecutionFailed(msg)) => assert_eq!(msg, "rate limited"),
            other => panic!("expected ExecutionFailed, got {:?}", other),
        }
        assert_eq!(llm.call_count(), 1);
    }
}
