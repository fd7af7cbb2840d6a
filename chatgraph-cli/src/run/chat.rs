//! Chat agent run: model + calculator tools, optional thread persistence.
//!
//! Builds a [`ChatRunner`](chatgraph::ChatRunner) from [`RunConfig`]; with a thread id the
//! conversation is persisted (SQLite at `db_path` when the `sqlite` feature is on).

use std::io::Write;
use std::sync::Arc;

use chatgraph::prebuilt::{CHAT_NODE, TOOLS_NODE};
use chatgraph::{
    ChatRunner, Checkpointer, LlmClient, Message, Snapshot, StreamEvent, ToolSource, MESSAGES_KEY,
};
use tracing::info;

use crate::config::{RunConfig, RunOptions};
use crate::tools::CalculatorToolSource;

use super::Error;

/// Opens the thread store: SQLite at `db_path` with the `sqlite` feature, in-memory otherwise.
pub fn open_checkpointer(db_path: &str) -> Result<Arc<dyn Checkpointer>, Error> {
    #[cfg(feature = "sqlite")]
    {
        info!(db_path = %db_path, "persisting threads in sqlite");
        Ok(Arc::new(chatgraph::SqliteSaver::new(db_path)?))
    }
    #[cfg(not(feature = "sqlite"))]
    {
        info!(db_path = %db_path, "sqlite disabled; threads live in memory");
        Ok(Arc::new(chatgraph::MemorySaver::new()))
    }
}

fn checkpointer_for(config: &RunConfig) -> Result<Option<Arc<dyn Checkpointer>>, Error> {
    match config.thread_id {
        Some(_) => open_checkpointer(&config.db_path).map(Some),
        None => Ok(None),
    }
}

/// Prints token chunks and tool activity as the run streams.
fn print_event(event: &StreamEvent) {
    let mut out = std::io::stdout();
    match event {
        StreamEvent::Messages { chunk, .. } => {
            let _ = write!(out, "{}", chunk.content);
        }
        StreamEvent::Updates { node_id, update } => {
            let written: Vec<Message> = update
                .get(MESSAGES_KEY)
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default();
            if node_id == CHAT_NODE {
                for call in written.iter().flat_map(|m| m.tool_calls()) {
                    let _ = writeln!(out);
                    let _ = writeln!(out, "[Calling tool: {}]", call.name);
                }
            } else if node_id == TOOLS_NODE {
                let _ = writeln!(out, "[Tool results received: {}]", written.len());
            }
        }
        _ => {}
    }
    let _ = out.flush();
}

/// Runs one chat turn with the given model; does not read .env.
///
/// Used by [`run_chat`] and by tests that inject `MockLlm`.
pub async fn run_chat_with_llm(
    llm: Arc<dyn LlmClient>,
    config: &RunConfig,
    user_message: &str,
) -> Result<Snapshot, Error> {
    let tools: Arc<dyn ToolSource> = Arc::new(CalculatorToolSource);
    let runner = ChatRunner::new(
        llm,
        Some(tools),
        checkpointer_for(config)?,
        config.system_prompt.clone(),
        config.verbose,
    )?;
    let runnable = Some(config.runnable_config());

    let state = if config.stream {
        let state = runner
            .stream_with_callback(user_message, runnable, Some(print_event))
            .await?;
        println!();
        state
    } else {
        runner.invoke(user_message, runnable).await?
    };
    Ok(state)
}

/// Builds the OpenAI-compatible chat model from `config`, with the calculator tools attached.
#[cfg(feature = "openai")]
pub async fn chat_model(config: &RunConfig) -> Result<Arc<dyn LlmClient>, Error> {
    use async_openai::config::OpenAIConfig;
    use chatgraph::ChatOpenAI;

    let openai_config = OpenAIConfig::new()
        .with_api_base(config.api_base.trim_end_matches('/'))
        .with_api_key(config.api_key.clone());
    let tools = CalculatorToolSource.list_tools().await?;
    let mut llm = ChatOpenAI::with_config(openai_config, config.model.clone()).with_tools(tools);
    if let Some(t) = config.temperature {
        llm = llm.with_temperature(t);
    }
    if let Some(tc) = config.tool_choice {
        llm = llm.with_tool_choice(tc);
    }
    Ok(Arc::new(llm))
}

#[cfg(not(feature = "openai"))]
pub async fn chat_model(_config: &RunConfig) -> Result<Arc<dyn LlmClient>, Error> {
    Err("chatgraph-cli was built without the `openai` feature".into())
}

/// Runs one chat turn against the configured OpenAI-compatible endpoint.
pub async fn run_chat(config: &RunConfig, user_message: &str) -> Result<Snapshot, Error> {
    let llm = chat_model(config).await?;
    run_chat_with_llm(llm, config, user_message).await
}

/// Loads `.env`, builds `RunConfig` from env, applies `options`, then runs one chat turn.
pub async fn run_chat_with_options(
    user_message: &str,
    options: &RunOptions,
) -> Result<Snapshot, Error> {
    dotenv::dotenv().ok();
    let mut config = RunConfig::from_env()?;
    config.apply_options(options);
    run_chat(&config, user_message).await
}
