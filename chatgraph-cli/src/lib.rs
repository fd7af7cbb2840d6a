//! chatgraph-cli library: reusable run logic for the `chatgraph` binary and other crates.
//!
//! - `counter`: one node over an overwrite channel.
//! - `route`: a router picks one of two branches from a boolean channel.
//! - `chat`: model + calculator tools, with thread memory when a thread id is given.
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), chatgraph_cli::Error> {
//! let state = chatgraph_cli::run_chat_with_options("What is 6 * 7?", &Default::default()).await?;
//! for m in state.messages()? {
//!     println!("{}", chatgraph_cli::format_message(&m));
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod run;
mod tools;

pub use chatgraph::{Message, Snapshot};
pub use config::{Error, RunConfig, RunOptions, DEFAULT_DB_PATH};
pub use run::{
    chat_model, counter_graph, format_message, open_checkpointer, route_graph, run_chat,
    run_chat_with_llm, run_chat_with_options, run_counter, run_route,
};
pub use tools::CalculatorToolSource;

#[cfg(test)]
mod tests;
