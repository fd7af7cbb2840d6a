//! Router for the chat/tools loop.

use crate::graph::Next;
use crate::state::Snapshot;

/// Node id of the chat model node in the prebuilt chat graph.
pub const CHAT_NODE: &str = "chat";

/// Node id of the tool execution node in the prebuilt chat graph.
pub const TOOLS_NODE: &str = "tools";

/// Routes to [`TOOLS_NODE`] when the last message is an assistant message with
/// tool calls, and ends the run otherwise.
///
/// An unreadable `messages` channel ends the run; the chat node surfaces the
/// underlying error on its own read.
pub fn tools_condition(state: &Snapshot) -> Next {
    let messages = match state.messages() {
        Ok(m) => m,
        Err(_) => return Next::End,
    };
    match messages.last() {
        Some(last) if !last.tool_calls().is_empty() => Next::Node(TOOLS_NODE.to_string()),
        _ => Next::End,
    }
}
