//! End-to-end runs: single node, conditional routing, fan-out merge rules.

use chatgraph::{Channel, ErrorKind, GraphError, StateGraph, Update, END, START};
use serde_json::json;

use crate::common::{counter_graph, flag_graph};

/// **Scenario**: START -> start -> END with an overwrite counter ends at 1.
#[tokio::test]
async fn single_node_overwrites_counter() {
    let compiled = counter_graph().compile().unwrap();
    let out = compiled
        .invoke(Update::new().set("counter", 0), None)
        .await
        .unwrap();
    assert_eq!(out.get("counter"), Some(&json!(1)));
}

/// **Scenario**: The router sends flag=true to b only and flag=false to c only.
#[tokio::test]
async fn router_applies_only_the_chosen_branch() {
    let compiled = flag_graph().compile().unwrap();

    let out = compiled
        .invoke(Update::new().set("flag", true), None)
        .await
        .unwrap();
    assert_eq!(out.get("result"), Some(&json!("from b")));
    assert_eq!(out.get("visited"), Some(&json!(["a", "b"])));

    let out = compiled
        .invoke(Update::new().set("flag", false), None)
        .await
        .unwrap();
    assert_eq!(out.get("result"), Some(&json!("from c")));
    assert_eq!(out.get("visited"), Some(&json!(["a", "c"])));
}

/// **Scenario**: Overwrite channels keep the last write across sequential steps.
#[tokio::test]
async fn overwrite_keeps_last_step_value() {
    let mut graph = StateGraph::new([Channel::last_value("v", 0)]);
    graph
        .add_fn_node("one", |_s| async { Ok(Update::new().set("v", 1)) })
        .add_fn_node("two", |_s| async { Ok(Update::new().set("v", 2)) })
        .add_fn_node("three", |_s| async { Ok(Update::new().set("v", 3)) })
        .add_edge(START, "one")
        .add_edge("one", "two")
        .add_edge("two", "three")
        .add_edge("three", END);
    let out = graph.compile().unwrap().invoke(Update::new(), None).await.unwrap();
    assert_eq!(out.get("v"), Some(&json!(3)));
}

/// **Scenario**: Fan-out writes to an append channel all land, in node registration order.
#[tokio::test]
async fn fan_out_appends_in_registration_order() {
    let mut graph = StateGraph::new([Channel::append("items")]);
    graph
        .add_fn_node("split", |_s| async { Ok(Update::new().set("items", json!(["s"]))) })
        .add_fn_node("left", |_s| async { Ok(Update::new().set("items", json!(["l1", "l2"]))) })
        .add_fn_node("right", |_s| async { Ok(Update::new().set("items", json!(["r"]))) })
        .add_edge(START, "split")
        .add_edge("split", "right")
        .add_edge("split", "left")
        .add_edge("left", END)
        .add_edge("right", END);
    let out = graph
        .compile()
        .unwrap()
        .invoke(Update::new().set("items", json!(["init"])), None)
        .await
        .unwrap();
    let items = out.get("items").and_then(|v| v.as_array()).unwrap();
    assert_eq!(items.len(), 1 + 1 + 2 + 1);
    assert_eq!(out.get("items"), Some(&json!(["init", "s", "l1", "l2", "r"])));
}

/// **Scenario**: Two fan-out nodes writing one overwrite channel fail; neither value is applied.
#[tokio::test]
async fn fan_out_overwrite_conflict_is_an_error() {
    let mut graph = StateGraph::new([Channel::last_value("winner", "none")]);
    graph
        .add_fn_node("split", |_s| async { Ok(Update::new()) })
        .add_fn_node("x", |_s| async { Ok(Update::new().set("winner", "x")) })
        .add_fn_node("y", |_s| async { Ok(Update::new().set("winner", "y")) })
        .add_edge(START, "split")
        .add_edge("split", "x")
        .add_edge("split", "y")
        .add_edge("x", END)
        .add_edge("y", END);
    let compiled = graph.compile().unwrap();

    let err = compiled.invoke(Update::new(), None).await.unwrap_err();
    match &err {
        GraphError::ConcurrentWriteConflict { channel, nodes } => {
            assert_eq!(channel, "winner");
            assert_eq!(nodes, &vec!["x".to_string(), "y".to_string()]);
        }
        other => panic!("expected ConcurrentWriteConflict, got {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::ConcurrentWriteConflict);
}

/// **Scenario**: An initial update naming an undeclared channel fails with UnknownChannel.
#[tokio::test]
async fn unknown_channel_in_initial_update() {
    let compiled = counter_graph().compile().unwrap();
    let err = compiled
        .invoke(Update::new().set("nope", 1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::UnknownChannel(k) if k == "nope"));
}

/// **Scenario**: A failing node aborts the run and names the node.
#[tokio::test]
async fn node_failure_names_node() {
    let mut graph = StateGraph::new([Channel::last_value("x", 0)]);
    graph
        .add_fn_node("fails", |_s| async {
            Err::<Update, _>(chatgraph::AgentError::ExecutionFailed("upstream 503".into()))
        })
        .add_edge(START, "fails")
        .add_edge("fails", END);
    let err = graph.compile().unwrap().invoke(Update::new(), None).await.unwrap_err();
    let payload = err.to_payload();
    assert_eq!(payload.kind, ErrorKind::NodeExecution);
    assert_eq!(payload.node.as_deref(), Some("fails"));
    assert!(!payload.message.contains("503"));
}
