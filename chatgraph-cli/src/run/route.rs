//! Conditional routing: START -> check -> (flag ? on_true : on_false) -> END.

use chatgraph::{
    Channel, CompilationError, CompiledStateGraph, Next, Snapshot, StateGraph, Update, END, START,
};
use tracing::debug;

use super::Error;

fn pick_branch(state: &Snapshot) -> Next {
    let flag = state.get_as::<bool>("flag").unwrap_or(false);
    debug!(flag, "routing on flag");
    if flag {
        Next::Node("on_true".to_string())
    } else {
        Next::Node("on_false".to_string())
    }
}

/// Builds the routing graph. Each node appends its name to `path`; the branch
/// nodes also set `result`.
pub fn route_graph() -> Result<CompiledStateGraph, CompilationError> {
    let mut graph = StateGraph::new([
        Channel::last_value("flag", false),
        Channel::last_value("result", serde_json::Value::Null),
        Channel::append("path"),
    ]);
    graph
        .add_fn_node("check", |_s| async { Ok(Update::new().set("path", "check")) })
        .add_fn_node("on_true", |_s| async {
            Ok(Update::new()
                .set("path", "on_true")
                .set("result", "flag was set"))
        })
        .add_fn_node("on_false", |_s| async {
            Ok(Update::new()
                .set("path", "on_false")
                .set("result", "flag was not set"))
        })
        .add_edge(START, "check")
        .add_conditional_edges_to("check", pick_branch, ["on_true", "on_false"])
        .add_edge("on_true", END)
        .add_edge("on_false", END);
    graph.compile()
}

/// Runs the routing graph with the given flag and returns the final state.
pub async fn run_route(flag: bool) -> Result<Snapshot, Error> {
    let compiled = route_graph()?;
    Ok(compiled.invoke(Update::new().set("flag", flag), None).await?)
}
