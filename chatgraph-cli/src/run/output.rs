//! Plain-text rendering of chat messages for the terminal.

use chatgraph::Message;

/// One line per message, prefixed with its role. Tool calls are listed after the
/// assistant text.
pub fn format_message(message: &Message) -> String {
    match message {
        Message::System { content, .. } => format!("[System] {}", content),
        Message::Human { content, .. } => format!("[User] {}", content),
        Message::Assistant {
            content,
            tool_calls,
            ..
        } => {
            let mut line = format!("[Assistant] {}", content);
            for call in tool_calls {
                line.push_str(&format!("\n  -> {}({})", call.name, call.arguments));
            }
            line
        }
        Message::Tool {
            content,
            tool_call_id,
            ..
        } => format!("[Tool {}] {}", tool_call_id, content),
    }
}
