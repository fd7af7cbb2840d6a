//! Optional overrides for a chat run (CLI args or programmatic).
//!
//! Used by [`RunConfig::apply_options`](super::RunConfig::apply_options) and
//! [`run_chat_with_options`](crate::run_chat_with_options).

use chatgraph::ToolChoiceMode;

/// Optional overrides for a run. All fields are optional; only set fields override
/// the base config (from env). `stream` and `verbose` only ever switch on.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Override sampling temperature (0-2).
    pub temperature: Option<f32>,
    /// Override tool choice mode (auto, none, required).
    pub tool_choice: Option<ToolChoiceMode>,
    /// Conversation thread; turns on persistence.
    pub thread_id: Option<String>,
    /// Override SQLite database path for persisted threads.
    pub db_path: Option<String>,
    pub system_prompt: Option<String>,
    pub recursion_limit: Option<usize>,
    /// Print model tokens as they arrive.
    pub stream: bool,
    /// Log node enter/exit and graph steps.
    pub verbose: bool,
}
