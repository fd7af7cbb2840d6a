//! LLM client abstraction for the chat node.
//!
//! ChatNode depends on a callable that returns assistant text and optional
//! tool_calls; this module defines the trait, a scripted mock and (feature
//! `openai`) an OpenAI-compatible client.

mod mock;

#[cfg(feature = "openai")]
mod openai;

pub use mock::MockLlm;

#[cfg(feature = "openai")]
pub use openai::ChatOpenAI;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AgentError;
use crate::message::{Message, ToolCall};

/// Tool choice mode for chat completions: when tools are present, controls whether
/// the model may choose (auto), must not use (none), or must use (required).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToolChoiceMode {
    /// Model can pick between message or tool calls. Default when tools are present.
    #[default]
    Auto,
    /// Model will not call any tool.
    None,
    /// Model must call one or more tools.
    Required,
}

impl std::str::FromStr for ToolChoiceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "none" => Ok(Self::None),
            "required" => Ok(Self::Required),
            _ => Err(format!(
                "unknown tool_choice: {} (use auto, none, or required)",
                s
            )),
        }
    }
}

/// Response from an LLM completion: assistant message text and optional tool calls.
///
/// **Interaction**: Returned by `LlmClient::invoke()`; ChatNode turns it into one
/// assistant message carrying `content` and `tool_calls`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Tool calls from this turn; empty means the model answered directly.
    pub tool_calls: Vec<ToolCall>,
}

/// LLM client: given messages, returns assistant text and optional tool_calls.
///
/// Implementations: `MockLlm` (scripted responses), `ChatOpenAI` (real API, feature `openai`).
///
/// **Interaction**: Passed as `Arc<dyn LlmClient>` into `ChatNode` at graph construction.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one turn: read messages, return assistant content and optional tool_calls.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;

    /// Like `invoke`, but forwards content deltas to `chunks` as they arrive.
    ///
    /// The returned response holds the full content. Default sends the whole content as
    /// one chunk after `invoke`.
    async fn invoke_stream(
        &self,
        messages: &[Message],
        chunks: mpsc::Sender<String>,
    ) -> Result<LlmResponse, AgentError> {
        let response = self.invoke(messages).await?;
        if !response.content.is_empty() {
            let _ = chunks.send(response.content.clone()).await;
        }
        Ok(response)
    }
}
