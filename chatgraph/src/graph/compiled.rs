//! Compiled state graph: immutable, supports invoke, stream and state inspection.
//!
//! Built by `StateGraph::compile` or `compile_with_checkpointer`. Each run owns a
//! fresh `ChannelStore`. A step runs the current node set concurrently, merges the
//! partial updates in registration order, then resolves the next node set from the
//! edges of the nodes that ran. With a checkpointer and `config.thread_id`, the
//! latest checkpoint is the base state and a checkpoint is saved after every step.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::channels::{Channel, ChannelStore};
use crate::error::GraphError;
use crate::memory::{
    Checkpoint, CheckpointError, CheckpointListItem, CheckpointSource, Checkpointer,
    RunnableConfig,
};
use crate::state::{Snapshot, Update};
use crate::stream::{StreamEvent, StreamMode};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_step_merged,
};
use super::node_middleware::{NodeFuture, NodeMiddleware};
use super::{Node, RunContext, Router};

/// Conditional edge of a compiled node.
#[derive(Clone)]
pub(super) struct Branch {
    pub(super) router: Arc<dyn Router>,
    /// Allowed destinations; `None` allows any registered node.
    pub(super) targets: Option<HashSet<String>>,
}

/// A registered node with its outgoing edges.
#[derive(Clone)]
pub(super) struct CompiledNode {
    pub(super) node: Arc<dyn Node>,
    /// Registration index; orders merges and fan-outs.
    pub(super) order: usize,
    pub(super) edges: Vec<String>,
    pub(super) branches: Vec<Branch>,
}

/// Compiled graph: immutable structure; cheap to clone and share across tasks.
///
/// Created by `StateGraph::compile()` or `compile_with_checkpointer()`.
///
/// **Interaction**: `invoke` returns the final snapshot; `stream` yields `StreamEvent`s;
/// `get_state` / `update_state` / `get_state_history` read and edit persisted threads.
#[derive(Clone)]
pub struct CompiledStateGraph {
    pub(super) channels: Arc<[Channel]>,
    pub(super) nodes: Arc<HashMap<String, CompiledNode>>,
    pub(super) entry: String,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware>>,
}

impl CompiledStateGraph {
    /// Runs the graph to completion and returns the final snapshot.
    ///
    /// `initial` is merged through the channel reducers onto the defaults, or onto the
    /// latest checkpoint of `config.thread_id` when the graph has a checkpointer.
    /// Pass `None` for config to run without persistence.
    pub async fn invoke(
        &self,
        initial: Update,
        config: Option<RunnableConfig>,
    ) -> Result<Snapshot, GraphError> {
        let config = config.unwrap_or_default();
        self.run(initial, &config, None).await
    }

    /// Streams graph execution, emitting events via channel-backed Stream.
    ///
    /// A failed run ends the stream with `StreamEvent::Error`.
    pub fn stream(
        &self,
        initial: Update,
        config: Option<RunnableConfig>,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let config = config.unwrap_or_default();
        let run_ctx = RunContext::new(config.clone(), Some(tx.clone()), stream_mode.into());

        tokio::spawn(async move {
            if let Err(e) = graph.run(initial, &config, Some(&run_ctx)).await {
                let _ = tx.send(StreamEvent::Error(e.to_payload())).await;
            }
        });

        ReceiverStream::new(rx)
    }

    /// Latest persisted snapshot of `config.thread_id` (or `config.checkpoint_id`).
    /// `Ok(None)` when the graph has no checkpointer or the thread has no checkpoints.
    pub async fn get_state(&self, config: &RunnableConfig) -> Result<Option<Snapshot>, GraphError> {
        let Some(checkpointer) = &self.checkpointer else {
            return Ok(None);
        };
        Ok(checkpointer
            .load(config)
            .await?
            .map(|checkpoint| checkpoint.channel_values))
    }

    /// Checkpoints of the thread, newest first.
    pub async fn get_state_history(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, GraphError> {
        match &self.checkpointer {
            Some(checkpointer) => Ok(checkpointer.list(config, limit).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Merges `update` through the reducers onto the thread's state without running any
    /// node, and saves the result as a new checkpoint (source `Update`). Returns its id.
    pub async fn update_state(
        &self,
        config: &RunnableConfig,
        update: Update,
    ) -> Result<String, GraphError> {
        let Some(checkpointer) = &self.checkpointer else {
            return Err(GraphError::Checkpoint(CheckpointError::Storage(
                "graph has no checkpointer".into(),
            )));
        };
        let thread_id = config
            .thread_id
            .as_deref()
            .ok_or(CheckpointError::ThreadIdRequired)?;
        let _lease = checkpointer.lease(thread_id)?;

        let mut store = ChannelStore::initialize(&self.channels);
        let mut step = 0;
        if let Some(checkpoint) = checkpointer.load(config).await? {
            store.restore(&checkpoint.channel_values)?;
            step = checkpoint.metadata.step;
        }
        store.apply_update(&update)?;
        let checkpoint = Checkpoint::from_state(store.snapshot(), CheckpointSource::Update, step);
        Ok(checkpointer.save(&save_config(config), &checkpoint).await?)
    }

    async fn run(
        &self,
        initial: Update,
        config: &RunnableConfig,
        run_ctx: Option<&RunContext>,
    ) -> Result<Snapshot, GraphError> {
        log_graph_start(config.thread_id.as_deref());
        let result = self.run_loop(initial, config, run_ctx).await;
        match &result {
            Ok((_, steps)) => log_graph_complete(config.thread_id.as_deref(), *steps),
            Err(e) => log_graph_error(e),
        }
        result.map(|(snapshot, _)| snapshot)
    }

    /// Shared run loop used by invoke() and stream(). Returns the final snapshot and
    /// the number of steps executed.
    async fn run_loop(
        &self,
        initial: Update,
        config: &RunnableConfig,
        run_ctx: Option<&RunContext>,
    ) -> Result<(Snapshot, usize), GraphError> {
        let persist = match (&self.checkpointer, config.thread_id.as_deref()) {
            (Some(checkpointer), Some(thread_id)) => Some((checkpointer, thread_id)),
            _ => None,
        };
        let _lease = match persist {
            Some((checkpointer, thread_id)) => Some(checkpointer.lease(thread_id)?),
            None => None,
        };

        let mut store = ChannelStore::initialize(&self.channels);
        let mut step = 0u64;
        if let Some((checkpointer, _)) = persist {
            if let Some(checkpoint) = checkpointer.load(config).await? {
                store.restore(&checkpoint.channel_values)?;
                step = checkpoint.metadata.step;
            }
        }
        store.apply_update(&initial)?;

        let limit = config.effective_recursion_limit();
        let save_config = save_config(config);
        let mut frontier = vec![self.entry.clone()];
        let mut steps_run = 0usize;

        while !frontier.is_empty() {
            if config.is_cancelled() {
                return Err(GraphError::Cancelled);
            }
            if steps_run >= limit {
                return Err(GraphError::RecursionLimit(limit));
            }
            steps_run += 1;

            let before = store.snapshot();
            let writes = self.run_step(&frontier, &before, run_ctx).await?;
            store.apply_step(&writes)?;
            let after = store.snapshot();
            let next = self.resolve_next(&frontier, &after)?;
            step += 1;
            log_step_merged(step, &frontier, &next);

            if let Some(ctx) = run_ctx {
                if ctx.wants(StreamMode::Updates) {
                    for (node_id, update) in &writes {
                        ctx.emit(StreamEvent::Updates {
                            node_id: node_id.clone(),
                            update: update.clone(),
                        })
                        .await;
                    }
                }
                if ctx.wants(StreamMode::Values) {
                    ctx.emit(StreamEvent::Values(after.clone())).await;
                }
            }

            if let Some((checkpointer, _)) = persist {
                let checkpoint = Checkpoint::from_state(after, CheckpointSource::Loop, step);
                checkpointer.save(&save_config, &checkpoint).await?;
            }
            frontier = next;
        }

        Ok((store.snapshot(), steps_run))
    }

    /// Runs every node of the step concurrently; results are returned in frontier order.
    async fn run_step(
        &self,
        frontier: &[String],
        snapshot: &Snapshot,
        run_ctx: Option<&RunContext>,
    ) -> Result<Vec<(String, Update)>, GraphError> {
        let calls = frontier
            .iter()
            .map(|node_id| self.run_node(node_id, snapshot, run_ctx));
        let updates = try_join_all(calls).await?;
        Ok(frontier.iter().cloned().zip(updates).collect())
    }

    async fn run_node(
        &self,
        node_id: &str,
        snapshot: &Snapshot,
        run_ctx: Option<&RunContext>,
    ) -> Result<Update, GraphError> {
        let node = self
            .nodes
            .get(node_id)
            .ok_or_else(|| GraphError::UnknownNode {
                from: super::START.to_string(),
                target: node_id.to_string(),
            })?
            .node
            .clone();
        let ctx = run_ctx.map(|ctx| ctx.for_node(node_id));
        log_node_start(node_id);

        let result = if let Some(middleware) = &self.middleware {
            middleware
                .around_run(
                    node_id,
                    snapshot.clone(),
                    Box::new(move |s: Snapshot| -> NodeFuture {
                        Box::pin(async move {
                            match ctx.as_ref() {
                                Some(ctx) => node.run_with_context(&s, ctx).await,
                                None => node.run(&s).await,
                            }
                        })
                    }),
                )
                .await
        } else if let Some(ctx) = ctx.as_ref() {
            node.run_with_context(snapshot, ctx).await
        } else {
            node.run(snapshot).await
        };

        let update = result.map_err(|source| GraphError::NodeExecution {
            node: node_id.to_string(),
            source,
        })?;
        log_node_complete(node_id, update.len());
        Ok(update)
    }

    /// Next node set: fixed edges and router results of every node that ran, END
    /// dropped, deduplicated, ordered by registration.
    fn resolve_next(&self, ran: &[String], after: &Snapshot) -> Result<Vec<String>, GraphError> {
        let mut next: Vec<String> = Vec::new();
        for node_id in ran {
            let compiled = self
                .nodes
                .get(node_id)
                .ok_or_else(|| GraphError::UnknownNode {
                    from: super::START.to_string(),
                    target: node_id.clone(),
                })?;
            let mut targets: Vec<String> = compiled
                .edges
                .iter()
                .filter(|to| to.as_str() != super::END)
                .cloned()
                .collect();
            for branch in &compiled.branches {
                let routed = branch.router.route(after).into_targets();
                for target in &routed {
                    let allowed = branch
                        .targets
                        .as_ref()
                        .map_or(true, |allowed| allowed.contains(target));
                    if !allowed || !self.nodes.contains_key(target) {
                        return Err(GraphError::UnknownNode {
                            from: node_id.clone(),
                            target: target.clone(),
                        });
                    }
                }
                targets.extend(routed);
            }
            for target in targets {
                if !next.contains(&target) {
                    next.push(target);
                }
            }
        }
        next.sort_by_key(|id| self.nodes.get(id).map_or(usize::MAX, |n| n.order));
        Ok(next)
    }
}

/// Saves always go to the head of the thread, also when resuming from an older checkpoint.
fn save_config(config: &RunnableConfig) -> RunnableConfig {
    RunnableConfig {
        checkpoint_id: None,
        ..config.clone()
    }
}
