//! Mapping of graph stream events to SSE events.

use axum::response::sse::Event;
use chatgraph::StreamEvent;
use serde_json::json;

use crate::error::error_body;

fn event(name: &str, data: serde_json::Value) -> Event {
    Event::default().event(name).data(data.to_string())
}

/// `token` for model chunks, `update` per node, `values` per step, `error` at the end of a failed run.
pub(crate) fn to_sse(ev: StreamEvent) -> Event {
    match ev {
        StreamEvent::Messages { chunk, metadata } => event(
            "token",
            json!({ "node": metadata.node_id, "content": chunk.content }),
        ),
        StreamEvent::Updates { node_id, update } => {
            event("update", json!({ "node": node_id, "update": update }))
        }
        StreamEvent::Values(snapshot) => {
            event("values", serde_json::to_value(&snapshot).unwrap_or_default())
        }
        StreamEvent::Error(p) => event(
            "error",
            error_body(p.kind.as_str(), p.node.as_deref(), &p.message),
        ),
    }
}

/// Last event of every stream.
pub(crate) fn done(thread_id: &str) -> Event {
    event("done", json!({ "thread_id": thread_id }))
}
