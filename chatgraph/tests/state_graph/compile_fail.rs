//! StateGraph compile failure cases: unknown node, missing entry, bad names.

use chatgraph::{Channel, CompilationError, Next, Snapshot, StateGraph, Update, END, START};

fn two_nodes() -> StateGraph {
    let mut graph = StateGraph::new([Channel::last_value("x", 0)]);
    graph
        .add_fn_node("a", |_s| async { Ok(Update::new()) })
        .add_fn_node("b", |_s| async { Ok(Update::new()) });
    graph
}

/// **Scenario**: An edge to an unregistered node fails with NodeNotFound.
#[test]
fn compile_fails_when_edge_refers_to_unknown_node() {
    let mut graph = two_nodes();
    graph.add_edge(START, "a").add_edge("a", "missing");

    match graph.compile() {
        Err(CompilationError::NodeNotFound(id)) => assert_eq!(id, "missing"),
        other => panic!("expected NodeNotFound, got {:?}", other.err()),
    }
}

/// **Scenario**: A graph with no edge from START fails with MissingStart.
#[test]
fn compile_fails_without_entry_edge() {
    let mut graph = two_nodes();
    graph.add_edge("a", "b").add_edge("b", END);
    assert_eq!(graph.compile().err(), Some(CompilationError::MissingStart));
}

/// **Scenario**: A router declared with an unknown target fails at compile, not at run.
#[test]
fn compile_fails_on_unknown_router_target() {
    let mut graph = two_nodes();
    graph
        .add_edge(START, "a")
        .add_conditional_edges_to("a", |_s: &Snapshot| Next::End, ["b", "ghost"]);
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::NodeNotFound("ghost".into()))
    );
}

/// **Scenario**: Registering the same node twice fails with DuplicateNode.
#[test]
fn compile_fails_on_duplicate_node() {
    let mut graph = two_nodes();
    graph
        .add_fn_node("b", |_s| async { Ok(Update::new()) })
        .add_edge(START, "a");
    assert_eq!(
        graph.compile().err(),
        Some(CompilationError::DuplicateNode("b".into()))
    );
}
