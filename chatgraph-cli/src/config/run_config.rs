//! Run config: API base, key, model, temperature, tool choice, persistence. Filled from env / .env.
//!
//! Interacts with [`RunOptions`](super::RunOptions), [`run_chat`](crate::run_chat) and
//! chatgraph's `ToolChoiceMode`.

use chatgraph::{RunnableConfig, ToolChoiceMode};

use super::RunOptions;

/// Error type used for config loading and CLI runs.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Default SQLite file for persisted chat threads.
pub const DEFAULT_DB_PATH: &str = "memory.db";

/// Run config for the chat command.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// OpenAI API base URL, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub api_key: String,
    /// Model name, e.g. `gpt-4o-mini`.
    pub model: String,
    /// Sampling temperature 0-2, lower is more deterministic. Default: unset (use API default).
    pub temperature: Option<f32>,
    /// Tool choice mode: auto (model chooses), none (no tools), required (must use tools).
    pub tool_choice: Option<ToolChoiceMode>,
    /// Conversation thread. When set, the thread is loaded before and saved after every step.
    pub thread_id: Option<String>,
    /// SQLite database path for persisted threads.
    pub db_path: String,
    /// System prompt prepended to every model call.
    pub system_prompt: Option<String>,
    /// Step limit per turn; `None` uses the graph default.
    pub recursion_limit: Option<usize>,
    /// When true, print model tokens and tool activity on stdout while running.
    pub stream: bool,
    /// When true, log node enter/exit and graph steps.
    pub verbose: bool,
}

impl RunConfig {
    /// Fill config from env vars. Call `dotenv::dotenv().ok()` first to pick up `.env`.
    ///
    /// `OPENAI_API_KEY` required; `OPENAI_API_BASE`, `OPENAI_MODEL` and `DB_PATH` have defaults.
    /// `OPENAI_TEMPERATURE`, `OPENAI_TOOL_CHOICE` (auto|none|required), `THREAD_ID`,
    /// `SYSTEM_PROMPT` and `RECURSION_LIMIT` are optional.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "OPENAI_API_KEY is not set; please configure it in .env",
            )
        })?;
        let api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let temperature = std::env::var("OPENAI_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse().ok());
        let tool_choice = std::env::var("OPENAI_TOOL_CHOICE")
            .ok()
            .and_then(|s| s.parse().ok());
        let recursion_limit = match std::env::var("RECURSION_LIMIT") {
            Ok(s) => Some(s.parse::<usize>().map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("RECURSION_LIMIT must be a positive integer: {}", e),
                )
            })?),
            Err(_) => None,
        };
        Ok(Self {
            api_base,
            api_key,
            model,
            temperature,
            tool_choice,
            thread_id: std::env::var("THREAD_ID").ok(),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            system_prompt: std::env::var("SYSTEM_PROMPT").ok(),
            recursion_limit,
            stream: false,
            verbose: false,
        })
    }

    /// Apply optional overrides from `RunOptions` to this config.
    pub fn apply_options(&mut self, options: &RunOptions) {
        if let Some(t) = options.temperature {
            self.temperature = Some(t);
        }
        if let Some(tc) = options.tool_choice {
            self.tool_choice = Some(tc);
        }
        if options.thread_id.is_some() {
            self.thread_id = options.thread_id.clone();
        }
        if let Some(path) = &options.db_path {
            self.db_path = path.clone();
        }
        if options.system_prompt.is_some() {
            self.system_prompt = options.system_prompt.clone();
        }
        if options.recursion_limit.is_some() {
            self.recursion_limit = options.recursion_limit;
        }
        self.stream |= options.stream;
        self.verbose |= options.verbose;
    }

    /// Graph config for one turn: thread and step limit.
    pub fn runnable_config(&self) -> RunnableConfig {
        let mut config = RunnableConfig {
            thread_id: self.thread_id.clone(),
            ..Default::default()
        };
        if let Some(limit) = self.recursion_limit {
            config = config.with_recursion_limit(limit);
        }
        config
    }
}
