//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when channels, nodes or edges are inconsistent.

use thiserror::Error;

/// Error when compiling a state graph (e.g. edge references unknown node).
///
/// Returned by `StateGraph::compile()`. Validation ensures node names are unique and
/// not reserved, every edge endpoint (except START/END) is registered, and exactly
/// one fixed edge leaves START.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// A node id in an edge or router target set was not registered via `add_node`.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No fixed edge has from_id == START, or more than one such edge.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    #[error("node registered twice: {0}")]
    DuplicateNode(String),

    #[error("channel declared twice: {0}")]
    DuplicateChannel(String),

    /// A node used START or END as its name.
    #[error("node name is reserved: {0}")]
    ReservedName(String),

    /// Edge into START, out of END, or a conditional edge from START.
    #[error("invalid edge: {0}")]
    InvalidEdge(String),
}
