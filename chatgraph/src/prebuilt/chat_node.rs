//! Chat node: read the conversation, call the LLM, append one assistant message.
//!
//! The assistant message carries the model's tool calls (if any); `tools_condition`
//! decides from it whether the tools node runs next.
//!
//! # Streaming Support
//!
//! ChatNode implements `run_with_context`. When the run streams with
//! `StreamMode::Messages`, it calls `LlmClient::invoke_stream()` and forwards each
//! chunk as `StreamEvent::Messages` tagged with the node id.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AgentError;
use crate::graph::{Node, RunContext};
use crate::llm::{LlmClient, LlmResponse};
use crate::message::{Message, Role};
use crate::state::{Snapshot, Update, MESSAGES_KEY};
use crate::stream::StreamMode;

/// Chat node: one model turn over a message-list channel.
///
/// An optional system prompt is prepended to the prompt when the conversation has
/// no system message of its own; it is never written to state.
///
/// **Interaction**: Implements `Node`; used by `chat_graph`. Consumes `LlmClient`
/// (e.g. MockLlm, ChatOpenAI); writes to the messages channel.
pub struct ChatNode {
    llm: Arc<dyn LlmClient>,
    system_prompt: Option<String>,
    messages_key: String,
}

impl ChatNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            system_prompt: None,
            messages_key: MESSAGES_KEY.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Reads and writes `key` instead of the default `messages` channel.
    pub fn with_messages_key(mut self, key: impl Into<String>) -> Self {
        self.messages_key = key.into();
        self
    }

    fn prompt(&self, state: &Snapshot) -> Result<Vec<Message>, AgentError> {
        let mut messages = state.messages_in(&self.messages_key)?;
        if let Some(prompt) = &self.system_prompt {
            if !messages.iter().any(|m| m.role() == Role::System) {
                messages.insert(0, Message::system(prompt.as_str()));
            }
        }
        Ok(messages)
    }

    fn into_update(&self, response: LlmResponse) -> Result<Update, AgentError> {
        let reply = Message::assistant_with_tool_calls(response.content, response.tool_calls)
            .with_id(uuid::Uuid::new_v4().to_string());
        Update::new().with_messages(self.messages_key.as_str(), [reply])
    }
}

#[async_trait]
impl Node for ChatNode {
    async fn run(&self, state: &Snapshot) -> Result<Update, AgentError> {
        let prompt = self.prompt(state)?;
        let response = self.llm.invoke(&prompt).await?;
        self.into_update(response)
    }

    async fn run_with_context(
        &self,
        state: &Snapshot,
        ctx: &RunContext,
    ) -> Result<Update, AgentError> {
        if !ctx.wants(StreamMode::Messages) {
            return self.run(state).await;
        }

        let prompt = self.prompt(state)?;
        let (chunk_tx, mut chunk_rx) = mpsc::channel::<String>(128);
        let forward_ctx = ctx.clone();
        let forward_task = tokio::spawn(async move {
            while let Some(chunk) = chunk_rx.recv().await {
                forward_ctx.emit_message_chunk(chunk).await;
            }
        });

        let result = self.llm.invoke_stream(&prompt, chunk_tx).await;
        // chunk_tx was moved into invoke_stream and is dropped by now, so the task ends.
        let _ = forward_task.await;

        self.into_update(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::memory::RunnableConfig;
    use crate::message::ToolCall;
    use crate::stream::StreamEvent;
    use std::collections::HashSet;

    fn state(messages: Vec<Message>) -> Snapshot {
        [(
            MESSAGES_KEY.to_string(),
            serde_json::to_value(messages).unwrap(),
        )]
        .into_iter()
        .collect()
    }

    fn written(update: &Update) -> Vec<Message> {
        serde_json::from_value(update.get(MESSAGES_KEY).cloned().unwrap()).unwrap()
    }

    /// **Scenario**: ChatNode appends one assistant message with an id and the tool calls.
    #[tokio::test]
    async fn chat_node_appends_assistant_message() {
        let call = ToolCall {
            id: "c1".into(),
            name: "add".into(),
            arguments: r#"{"a":1,"b":2}"#.into(),
        };
        let llm = Arc::new(MockLlm::first_tool_then_answer(call.clone(), "3"));
        let node = ChatNode::new(llm);

        let update = node.run(&state(vec![Message::human("1+2?")])).await.unwrap();
        let messages = written(&update);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role(), Role::Assistant);
        assert!(messages[0].id().is_some());
        assert_eq!(messages[0].tool_calls(), &[call]);
    }

    /// **Scenario**: The system prompt reaches the model but is not written to state.
    #[tokio::test]
    async fn chat_node_prepends_system_prompt() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("ok"));
        let node = ChatNode::new(llm.clone()).with_system_prompt("be brief");

        let update = node.run(&state(vec![Message::human("hi")])).await.unwrap();
        let prompt = &llm.calls()[0];
        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt[0].role(), Role::System);
        assert_eq!(written(&update).len(), 1);

        let existing = state(vec![Message::system("custom"), Message::human("hi")]);
        node.run(&existing).await.unwrap();
        assert_eq!(llm.calls()[1].len(), 2);
    }

    /// **Scenario**: With Messages streaming on, the reply is forwarded as message chunks.
    #[tokio::test]
    async fn chat_node_streams_chunks() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("hello"));
        let node = ChatNode::new(llm);
        let (tx, mut rx) = mpsc::channel(16);
        let ctx = RunContext::new(
            RunnableConfig::default(),
            Some(tx),
            HashSet::from([StreamMode::Messages]),
        )
        .for_node("chat");

        node.run_with_context(&state(vec![Message::human("hi")]), &ctx)
            .await
            .unwrap();
        drop(ctx);

        let mut chunks = Vec::new();
        while let Some(event) = rx.recv().await {
            if let StreamEvent::Messages { chunk, metadata } = event {
                assert_eq!(metadata.node_id, "chat");
                chunks.push(chunk.content);
            }
        }
        assert_eq!(chunks.concat(), "hello");
    }

    /// **Scenario**: LLM failures surface as AgentError.
    #[tokio::test]
    async fn chat_node_propagates_llm_error() {
        let node = ChatNode::new(Arc::new(MockLlm::failing("upstream down")));
        let err = node.run(&state(vec![Message::human("hi")])).await.unwrap_err();
        assert!(matches!(err, AgentError::ExecutionFailed(_)));
    }
}
