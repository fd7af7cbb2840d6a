//! Run entry points: the `counter` and `route` walkthrough graphs and the `chat` agent.
//!
//! Re-exports [`run_counter`], [`run_route`], [`run_chat`], [`run_chat_with_options`]
//! and [`Error`].

pub use crate::config::Error;

mod chat;
mod counter;
mod output;
mod route;

pub use chat::{chat_model, open_checkpointer, run_chat, run_chat_with_llm, run_chat_with_options};
pub use counter::{counter_graph, run_counter};
pub use output::format_message;
pub use route::{route_graph, run_route};
