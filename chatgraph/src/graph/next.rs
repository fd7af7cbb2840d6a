//! Routing result: the next node, a fan-out set of nodes, or the end of the run.
//!
//! Returned by routers on conditional edges; consumed by `CompiledStateGraph`.

use super::state_graph::END;

/// Next step chosen by a router after a node ran.
///
/// - **Node(id)**: run that node in the next step.
/// - **Many(ids)**: fan out; all listed nodes run concurrently in the next step.
/// - **End**: this branch terminates.
///
/// A `Node(END)` or an `END` inside `Many` is the same as `End` for that destination.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    Node(String),
    Many(Vec<String>),
    End,
}

impl Next {
    /// Destination node ids with `END` removed, in the order the router returned them.
    pub fn into_targets(self) -> Vec<String> {
        match self {
            Next::Node(id) => vec![id],
            Next::Many(ids) => ids,
            Next::End => Vec::new(),
        }
        .into_iter()
        .filter(|id| id != END)
        .collect()
    }
}

impl From<&str> for Next {
    fn from(id: &str) -> Self {
        Next::Node(id.to_string())
    }
}

impl From<String> for Next {
    fn from(id: String) -> Self {
        Next::Node(id)
    }
}

impl From<Vec<String>> for Next {
    fn from(ids: Vec<String>) -> Self {
        Next::Many(ids)
    }
}
