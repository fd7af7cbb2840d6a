//! Channel store errors.

use thiserror::Error;

/// Error when reading or merging channel values.
///
/// Returned by [`ChannelStore`](super::ChannelStore); converted into
/// [`GraphError`](crate::error::GraphError) by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The key was not declared when the graph was built.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    /// More than one node of a step wrote a non-additive channel.
    #[error("concurrent write to channel '{channel}' by nodes {nodes:?}")]
    ConcurrentWriteConflict { channel: String, nodes: Vec<String> },

    /// The channel's reducer could not merge the update.
    #[error("invalid update for channel '{channel}': {reason}")]
    InvalidUpdate { channel: String, reason: String },
}
