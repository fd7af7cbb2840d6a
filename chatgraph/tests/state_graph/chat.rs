//! Prebuilt chat graph with MockLlm and MockToolSource.

use std::sync::Arc;

use chatgraph::prebuilt::{chat_graph, CHAT_NODE, TOOLS_NODE};
use chatgraph::{
    ChatRunner, MemorySaver, Message, MockLlm, MockToolSource, Role, RunnableConfig, StreamEvent,
    StreamMode, ToolCall, Update,
};
use tokio_stream::StreamExt;

fn get_time_call() -> ToolCall {
    ToolCall {
        id: "call-1".into(),
        name: "get_time".into(),
        arguments: "{}".into(),
    }
}

/// **Scenario**: The tool result reaches the model on its second call.
#[tokio::test]
async fn tool_result_is_sent_back_to_model() {
    let llm = Arc::new(MockLlm::first_tool_then_answer(get_time_call(), "It is noon."));
    let tools = Arc::new(MockToolSource::get_time_example());
    let runner = ChatRunner::new(llm.clone(), Some(tools.clone()), None, None, false).unwrap();

    let state = runner.invoke("time?", None).await.unwrap();
    let last = state.messages().unwrap().pop().unwrap();
    assert_eq!(last.content().as_text(), "It is noon.");

    assert_eq!(llm.call_count(), 2);
    let second_prompt = &llm.calls()[1];
    match second_prompt.last() {
        Some(Message::Tool {
            tool_call_id,
            content,
            ..
        }) => {
            assert_eq!(tool_call_id, "call-1");
            assert_eq!(content.as_text(), "2025-01-29 12:00:00");
        }
        other => panic!("expected tool message, got {:?}", other),
    }
    assert_eq!(tools.calls().len(), 1);
}

/// **Scenario**: Updates events name chat, tools, chat in order.
#[tokio::test]
async fn stream_updates_follow_the_loop() {
    let llm = Arc::new(MockLlm::first_tool_then_answer(get_time_call(), "done"));
    let tools = Arc::new(MockToolSource::get_time_example());
    let compiled = chat_graph(llm, Some(tools), None).compile().unwrap();

    let events: Vec<StreamEvent> = compiled
        .stream(
            Update::messages([Message::human("time?")]).unwrap(),
            None,
            [StreamMode::Updates],
        )
        .collect()
        .await;
    let nodes: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Updates { node_id, .. } => Some(node_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(nodes, vec![CHAT_NODE, TOOLS_NODE, CHAT_NODE]);
}

/// **Scenario**: A remembered thread plus a system prompt: history grows, prompt stays out of state.
#[tokio::test]
async fn chat_runner_thread_with_system_prompt() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("ok"));
    let saver = Arc::new(MemorySaver::new());
    let runner = ChatRunner::new(
        llm.clone(),
        None,
        Some(saver),
        Some("You are terse.".into()),
        false,
    )
    .unwrap();
    let config = RunnableConfig::for_thread("t");

    runner.invoke("one", Some(config.clone())).await.unwrap();
    let state = runner.invoke("two", Some(config.clone())).await.unwrap();
    let roles: Vec<Role> = state.messages().unwrap().iter().map(|m| m.role()).collect();
    assert_eq!(
        roles,
        vec![Role::Human, Role::Assistant, Role::Human, Role::Assistant]
    );
    assert_eq!(llm.calls()[1][0].role(), Role::System);

    let history = runner.graph().get_state_history(&config, None).await.unwrap();
    assert_eq!(history.len(), 2);
}
