//! HTTP server running one chatgraph chat turn per request.
//!
//! Configure via env: OPENAI_API_KEY, OPENAI_API_BASE, OPENAI_MODEL, DB_PATH, SYSTEM_PROMPT,
//! RECURSION_LIMIT, LISTEN (default `0.0.0.0:8123`). Load .env with dotenv.

use std::sync::Arc;

use chatgraph::ChatRunner;
use chatgraph_cli::{chat_model, open_checkpointer, CalculatorToolSource, RunConfig};
use chatgraph_server::{app, AppState};
use tracing::info;

const DEFAULT_LISTEN: &str = "0.0.0.0:8123";

/// Load .env from current directory; if not found, try parent (workspace root when run from crate dir).
fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        return;
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(parent) = cwd.parent() {
            let env_path = parent.join(".env");
            if env_path.is_file() {
                let _ = dotenv::from_path(env_path);
            }
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,chatgraph_server=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    load_dotenv();
    init_tracing();

    let mut config = RunConfig::from_env()?;
    config.verbose = std::env::var("VERBOSE").is_ok_and(|v| v == "1" || v == "true");

    let llm = chat_model(&config).await?;
    let checkpointer = open_checkpointer(&config.db_path)?;
    let runner = ChatRunner::new(
        llm,
        Some(Arc::new(CalculatorToolSource)),
        Some(checkpointer),
        config.system_prompt.clone(),
        config.verbose,
    )?;
    let state = Arc::new(AppState::new(runner).with_recursion_limit(config.recursion_limit));

    let addr = std::env::var("LISTEN").unwrap_or_else(|_| DEFAULT_LISTEN.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, model = %config.model, db = %config.db_path, "chatgraph-server listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
