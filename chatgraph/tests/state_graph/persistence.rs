//! Checkpointed threads: resume, round-trip, history, SQLite across reopen.

use std::sync::Arc;

use chatgraph::{
    Channel, Checkpoint, CheckpointSource, Checkpointer, MemorySaver, Message, Role,
    RunnableConfig, Snapshot, SqliteSaver, StateGraph, Update, END, START,
};
use serde_json::json;

use crate::common::{counter_graph, echo_graph};

fn texts(state: &Snapshot) -> Vec<String> {
    state
        .messages()
        .unwrap()
        .iter()
        .map(|m| m.content().as_text())
        .collect()
}

/// **Scenario**: A second run on the same thread appends onto the first run's messages.
#[tokio::test]
async fn second_run_extends_thread_history() {
    let saver: Arc<dyn Checkpointer> = Arc::new(MemorySaver::new());
    let compiled = echo_graph(saver);
    let config = RunnableConfig::for_thread("conv-1");

    let first = compiled
        .invoke(
            Update::messages([Message::human("hi").with_id("h1")]).unwrap(),
            Some(config.clone()),
        )
        .await
        .unwrap();
    assert_eq!(texts(&first), vec!["hi", "echo: hi"]);

    let second = compiled
        .invoke(
            Update::messages([Message::human("again").with_id("h2")]).unwrap(),
            Some(config.clone()),
        )
        .await
        .unwrap();
    assert_eq!(
        texts(&second),
        vec!["hi", "echo: hi", "again", "echo: again"]
    );
    let roles: Vec<Role> = second.messages().unwrap().iter().map(|m| m.role()).collect();
    assert_eq!(
        roles,
        vec![Role::Human, Role::Assistant, Role::Human, Role::Assistant]
    );

    let other = compiled
        .invoke(
            Update::messages([Message::human("fresh")]).unwrap(),
            Some(RunnableConfig::for_thread("conv-2")),
        )
        .await
        .unwrap();
    assert_eq!(texts(&other), vec!["fresh", "echo: fresh"]);
}

/// **Scenario**: save then load, fed to a no-op graph, ends with the saved snapshot.
#[tokio::test]
async fn saved_snapshot_round_trips_through_noop_graph() {
    let saver = Arc::new(MemorySaver::new());
    let config = RunnableConfig::for_thread("rt");
    let state: Snapshot = [
        ("counter".to_string(), json!(7)),
        ("tags".to_string(), json!(["a", "b"])),
    ]
    .into_iter()
    .collect();
    saver
        .save(
            &config,
            &Checkpoint::from_state(state.clone(), CheckpointSource::Update, 0),
        )
        .await
        .unwrap();
    let loaded = saver.load(&config).await.unwrap().unwrap().channel_values;

    let mut graph = StateGraph::new([Channel::last_value("counter", 0), Channel::append("tags")]);
    graph
        .add_fn_node("noop", |_s| async { Ok(Update::new()) })
        .add_edge(START, "noop")
        .add_edge("noop", END);
    let out = graph
        .compile()
        .unwrap()
        .invoke(Update::new().set("counter", loaded.get("counter").cloned().unwrap()), None)
        .await
        .unwrap();
    assert_eq!(out.get("counter"), loaded.get("counter"));

    let resumed = {
        let mut graph =
            StateGraph::new([Channel::last_value("counter", 0), Channel::append("tags")]);
        graph
            .add_fn_node("noop", |_s| async { Ok(Update::new()) })
            .add_edge(START, "noop")
            .add_edge("noop", END);
        graph
            .compile_with_checkpointer(saver.clone())
            .unwrap()
            .invoke(Update::new(), Some(config))
            .await
            .unwrap()
    };
    assert_eq!(resumed, state);
}

/// **Scenario**: Each step writes a loop checkpoint; history is newest first.
#[tokio::test]
async fn every_step_is_checkpointed() {
    let saver = Arc::new(MemorySaver::new());
    let compiled = echo_graph(saver.clone());
    let config = RunnableConfig::for_thread("hist");
    compiled
        .invoke(
            Update::messages([Message::human("one")]).unwrap(),
            Some(config.clone()),
        )
        .await
        .unwrap();

    let history = saver.list(&config, None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].metadata.source, CheckpointSource::Loop);
    assert_eq!(history[0].metadata.step, 1);

    let state = compiled.get_state(&config).await.unwrap().unwrap();
    assert_eq!(texts(&state), vec!["one", "echo: one"]);
}

/// **Scenario**: A thread persisted in SQLite resumes after the saver is reopened.
#[tokio::test]
async fn sqlite_thread_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("threads.db");
    let config = RunnableConfig::for_thread("persisted");

    {
        let saver = Arc::new(SqliteSaver::new(&path).unwrap());
        echo_graph(saver)
            .invoke(
                Update::messages([Message::human("first")]).unwrap(),
                Some(config.clone()),
            )
            .await
            .unwrap();
    }

    let saver = Arc::new(SqliteSaver::new(&path).unwrap());
    let out = echo_graph(saver)
        .invoke(
            Update::messages([Message::human("second")]).unwrap(),
            Some(config),
        )
        .await
        .unwrap();
    assert_eq!(
        texts(&out),
        vec!["first", "echo: first", "second", "echo: second"]
    );
}

/// **Scenario**: A counter graph without a thread id never touches the checkpointer.
#[tokio::test]
async fn run_without_thread_is_not_persisted() {
    let saver = Arc::new(MemorySaver::new());
    let compiled = counter_graph().compile_with_checkpointer(saver.clone()).unwrap();
    let out = compiled.invoke(Update::new(), None).await.unwrap();
    assert_eq!(out.get("counter"), Some(&json!(1)));
    assert!(saver
        .list(&RunnableConfig::for_thread("anything"), None)
        .await
        .unwrap()
        .is_empty());
}
