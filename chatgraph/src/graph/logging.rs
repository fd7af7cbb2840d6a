//! Logging utilities for graph execution.
//!
//! Structured `tracing` events for run start/complete/error, node start/complete
//! and step merges.

use crate::error::GraphError;

pub fn log_graph_start(thread_id: Option<&str>) {
    tracing::info!(thread_id = thread_id.unwrap_or("-"), "Starting graph execution");
}

pub fn log_graph_complete(thread_id: Option<&str>, steps: usize) {
    tracing::info!(
        thread_id = thread_id.unwrap_or("-"),
        steps,
        "Graph execution complete"
    );
}

pub fn log_graph_error(error: &GraphError) {
    tracing::error!(kind = error.kind().as_str(), node = error.node(), %error, "Graph execution error");
}

pub fn log_node_start(node_id: &str) {
    tracing::debug!(node_id, "Starting node execution");
}

pub fn log_node_complete(node_id: &str, updated: usize) {
    tracing::debug!(node_id, updated, "Node execution complete");
}

/// Log the merge of one step; `next` is the resolved destination set.
pub fn log_step_merged(step: u64, nodes: &[String], next: &[String]) {
    tracing::debug!(step, ?nodes, ?next, "Step merged");
}
