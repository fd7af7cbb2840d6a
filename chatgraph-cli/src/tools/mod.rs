//! Tool sources used by the chat graph.
//!
//! Re-exports [`CalculatorToolSource`].

mod calculator;

pub use calculator::CalculatorToolSource;
