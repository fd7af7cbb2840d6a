//! Routing functions for conditional edges.

use crate::state::Snapshot;

use super::Next;

/// Decides where a conditional edge leads, from the post-merge snapshot.
///
/// Implemented for any `Fn(&Snapshot) -> Next`; annotate the closure argument
/// (`|s: &Snapshot| ...`) so it is inferred as higher-ranked.
pub trait Router: Send + Sync {
    fn route(&self, state: &Snapshot) -> Next;
}

impl<F> Router for F
where
    F: Fn(&Snapshot) -> Next + Send + Sync,
{
    fn route(&self, state: &Snapshot) -> Next {
        self(state)
    }
}
