//! Shared graph builders for the integration tests.

use std::sync::Arc;

use chatgraph::{
    Channel, Checkpointer, CompiledStateGraph, Message, Next, Snapshot, StateGraph, Update, END,
    MESSAGES_KEY, START,
};

/// START -> start -> END; `start` writes `counter = 1`.
pub fn counter_graph() -> StateGraph {
    let mut graph = StateGraph::new([Channel::last_value("counter", 0)]);
    graph
        .add_fn_node("start", |_s| async { Ok(Update::new().set("counter", 1)) })
        .add_edge(START, "start")
        .add_edge("start", END);
    graph
}

/// START -> a -> (flag ? b : c) -> END; b and c each write `result`.
pub fn flag_graph() -> StateGraph {
    let mut graph = StateGraph::new([
        Channel::last_value("flag", false),
        Channel::last_value("result", ""),
        Channel::append("visited"),
    ]);
    graph
        .add_fn_node("a", |_s| async { Ok(Update::new().set("visited", "a")) })
        .add_fn_node("b", |_s| async {
            Ok(Update::new().set("result", "from b").set("visited", "b"))
        })
        .add_fn_node("c", |_s| async {
            Ok(Update::new().set("result", "from c").set("visited", "c"))
        })
        .add_edge(START, "a")
        .add_conditional_edges_to(
            "a",
            |s: &Snapshot| {
                if s.get_as::<bool>("flag").unwrap_or(false) {
                    Next::Node("b".into())
                } else {
                    Next::Node("c".into())
                }
            },
            ["b", "c"],
        )
        .add_edge("b", END)
        .add_edge("c", END);
    graph
}

/// START -> reply -> END over `messages`; `reply` appends "echo: <last human text>".
pub fn echo_graph(checkpointer: Arc<dyn Checkpointer>) -> CompiledStateGraph {
    let mut graph = StateGraph::new([Channel::messages(MESSAGES_KEY)]);
    graph
        .add_fn_node("reply", |s| async move {
            let messages = s.messages()?;
            let last = messages
                .last()
                .map(|m| m.content().as_text())
                .unwrap_or_default();
            Update::messages([Message::assistant(format!("echo: {}", last))])
        })
        .add_edge(START, "reply")
        .add_edge("reply", END);
    graph
        .compile_with_checkpointer(checkpointer)
        .expect("echo graph compiles")
}
