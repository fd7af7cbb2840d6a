//! Single-node graph: START -> increment -> END over one overwrite channel.

use chatgraph::{
    AgentError, Channel, CompilationError, CompiledStateGraph, Snapshot, StateGraph, Update, END,
    START,
};

use super::Error;

/// Builds the counter graph. `increment` writes `counter + 1`.
pub fn counter_graph() -> Result<CompiledStateGraph, CompilationError> {
    let mut graph = StateGraph::new([Channel::last_value("counter", 0)]);
    graph
        .add_fn_node("increment", |s| async move {
            let counter: i64 = s.get_as("counter")?;
            Ok::<_, AgentError>(Update::new().set("counter", counter + 1))
        })
        .add_edge(START, "increment")
        .add_edge("increment", END);
    graph.compile()
}

/// Runs the counter graph from `start` and returns the final state.
pub async fn run_counter(start: i64) -> Result<Snapshot, Error> {
    let compiled = counter_graph()?;
    Ok(compiled
        .invoke(Update::new().set("counter", start), None)
        .await?)
}
