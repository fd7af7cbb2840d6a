//! Conversation messages and the message-list merge.
//!
//! Roles match LangGraph/LangChain: human input, assistant reply (optionally with
//! tool calls), system prompt and tool result. A message is never edited in place;
//! the messages channel replaces it by id, removes it with a [`RemoveMessage`]
//! tombstone, or appends it (see [`add_messages`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tombstone id that clears the whole message list.
pub const REMOVE_ALL_MESSAGES: &str = "__remove_all__";

/// Message body: plain text or a structured JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Structured(Value),
}

impl Content {
    /// Text form of the content; structured payloads are rendered as compact JSON.
    pub fn as_text(&self) -> String {
        match self {
            Content::Text(s) => s.clone(),
            Content::Structured(v) => v.to_string(),
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(s) => f.write_str(s),
            Content::Structured(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<Value> for Content {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => Content::Text(s),
            other => Content::Structured(other),
        }
    }
}

/// One tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call id; the answering tool message carries it as `tool_call_id`.
    pub id: String,
    pub name: String,
    /// Arguments as the raw JSON string the model produced.
    pub arguments: String,
}

/// Role of a [`Message`], for display and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Human,
    Assistant,
    System,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Human => "human",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

/// A single message in the conversation.
///
/// Serialized with a `role` tag (`human`, `assistant`, `system`, `tool`). The optional
/// `id` is what the messages reducer matches on; messages without one are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    Human {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: Content,
    },
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: Content,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    System {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: Content,
    },
    Tool {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        content: Content,
        tool_call_id: String,
    },
}

impl Message {
    /// Builds a human (user) message.
    pub fn human(content: impl Into<Content>) -> Self {
        Self::Human {
            id: None,
            content: content.into(),
        }
    }

    /// Builds an assistant message without tool calls.
    pub fn assistant(content: impl Into<Content>) -> Self {
        Self::Assistant {
            id: None,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Builds an assistant message that requests tool calls.
    pub fn assistant_with_tool_calls(content: impl Into<Content>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            id: None,
            content: content.into(),
            tool_calls,
        }
    }

    /// Builds a system message.
    pub fn system(content: impl Into<Content>) -> Self {
        Self::System {
            id: None,
            content: content.into(),
        }
    }

    /// Builds a tool-result message answering `tool_call_id`.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<Content>) -> Self {
        Self::Tool {
            id: None,
            content: content.into(),
            tool_call_id: tool_call_id.into(),
        }
    }

    /// Returns the same message with the given stable id.
    pub fn with_id(mut self, new_id: impl Into<String>) -> Self {
        let slot = match &mut self {
            Message::Human { id, .. }
            | Message::Assistant { id, .. }
            | Message::System { id, .. }
            | Message::Tool { id, .. } => id,
        };
        *slot = Some(new_id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Message::Human { id, .. }
            | Message::Assistant { id, .. }
            | Message::System { id, .. }
            | Message::Tool { id, .. } => id.as_deref(),
        }
    }

    pub fn content(&self) -> &Content {
        match self {
            Message::Human { content, .. }
            | Message::Assistant { content, .. }
            | Message::System { content, .. }
            | Message::Tool { content, .. } => content,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::Human { .. } => Role::Human,
            Message::Assistant { .. } => Role::Assistant,
            Message::System { .. } => Role::System,
            Message::Tool { .. } => Role::Tool,
        }
    }

    /// Tool calls requested by an assistant message; empty for every other role.
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }
}

/// Tombstone: removes the message with `id` (or every message for [`REMOVE_ALL_MESSAGES`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveMessage {
    #[serde(rename = "remove")]
    pub id: String,
}

impl RemoveMessage {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn all() -> Self {
        Self::new(REMOVE_ALL_MESSAGES)
    }
}

/// One entry of a messages-channel update: a message to upsert or a tombstone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageUpdate {
    Remove(RemoveMessage),
    Upsert(Message),
}

impl From<Message> for MessageUpdate {
    fn from(m: Message) -> Self {
        MessageUpdate::Upsert(m)
    }
}

impl From<RemoveMessage> for MessageUpdate {
    fn from(r: RemoveMessage) -> Self {
        MessageUpdate::Remove(r)
    }
}

/// Merges `updates` into `current`, in the order supplied.
///
/// - A message whose id matches an existing message replaces it at the same position.
/// - A tombstone removes the message with its id; unknown ids are ignored.
/// - Anything else (including id-less messages) is appended.
///
/// Replaying the same update with stable ids yields the same list.
pub fn add_messages(current: Vec<Message>, updates: Vec<MessageUpdate>) -> Vec<Message> {
    let mut merged = current;
    for update in updates {
        match update {
            MessageUpdate::Remove(r) if r.id == REMOVE_ALL_MESSAGES => merged.clear(),
            MessageUpdate::Remove(r) => merged.retain(|m| m.id() != Some(r.id.as_str())),
            MessageUpdate::Upsert(message) => {
                let existing = message
                    .id()
                    .and_then(|id| merged.iter().position(|m| m.id() == Some(id)));
                match existing {
                    Some(pos) => merged[pos] = message,
                    None => merged.push(message),
                }
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<Message> {
        vec![
            Message::human("a").with_id("A"),
            Message::assistant("b").with_id("B"),
            Message::human("c").with_id("C"),
        ]
    }

    /// **Scenario**: Replacing B by id keeps its position: [A,B,C] -> [A,B',C].
    #[test]
    fn replace_by_id_preserves_position() {
        let updated = Message::assistant("b2").with_id("B");
        let out = add_messages(abc(), vec![updated.clone().into()]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].id(), Some("A"));
        assert_eq!(out[1], updated);
        assert_eq!(out[2].id(), Some("C"));
    }

    /// **Scenario**: Tombstone removes the matching message and keeps the others in order.
    #[test]
    fn remove_by_id() {
        let out = add_messages(abc(), vec![RemoveMessage::new("B").into()]);
        let ids: Vec<_> = out.iter().filter_map(|m| m.id()).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    /// **Scenario**: Tombstone for an unknown id is a no-op.
    #[test]
    fn remove_unknown_id_is_ignored() {
        let out = add_messages(abc(), vec![RemoveMessage::new("Z").into()]);
        assert_eq!(out, abc());
    }

    /// **Scenario**: Remove-all clears the list; later entries of the same update are appended.
    #[test]
    fn remove_all_then_append() {
        let out = add_messages(
            abc(),
            vec![RemoveMessage::all().into(), Message::human("fresh").into()],
        );
        assert_eq!(out, vec![Message::human("fresh")]);
    }

    /// **Scenario**: Applying the same update twice equals applying it once.
    #[test]
    fn replay_with_stable_ids_is_idempotent() {
        let update: Vec<MessageUpdate> = vec![
            Message::assistant("b2").with_id("B").into(),
            Message::human("d").with_id("D").into(),
            RemoveMessage::new("A").into(),
        ];
        let once = add_messages(abc(), update.clone());
        let twice = add_messages(once.clone(), update);
        assert_eq!(once, twice);
        let ids: Vec<_> = once.iter().filter_map(|m| m.id()).collect();
        assert_eq!(ids, vec!["B", "C", "D"]);
    }

    /// **Scenario**: Messages without ids are append-only, even with identical content.
    #[test]
    fn id_less_messages_always_append() {
        let out = add_messages(vec![Message::human("hi")], vec![Message::human("hi").into()]);
        assert_eq!(out.len(), 2);
    }

    /// **Scenario**: Wire form uses a role tag and omits empty optionals; tombstones use `remove`.
    #[test]
    fn serde_wire_form() {
        let m = Message::assistant_with_tool_calls(
            "",
            vec![ToolCall {
                id: "call_1".into(),
                name: "add".into(),
                arguments: r#"{"a":1,"b":2}"#.into(),
            }],
        );
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["role"], "assistant");
        assert!(v.get("id").is_none());
        assert_eq!(v["tool_calls"][0]["name"], "add");

        let parsed: Vec<MessageUpdate> = serde_json::from_value(serde_json::json!([
            { "remove": "x" },
            { "role": "human", "content": "hello", "id": "h1" },
            { "role": "tool", "content": { "sum": 3 }, "tool_call_id": "call_1" }
        ]))
        .unwrap();
        assert_eq!(parsed[0], MessageUpdate::Remove(RemoveMessage::new("x")));
        assert_eq!(
            parsed[1],
            MessageUpdate::Upsert(Message::human("hello").with_id("h1"))
        );
        match &parsed[2] {
            MessageUpdate::Upsert(Message::Tool { content, .. }) => {
                assert_eq!(content.as_text(), r#"{"sum":3}"#)
            }
            other => panic!("expected tool message, got {:?}", other),
        }
    }
}
