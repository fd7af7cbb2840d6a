//! State graph: channels + nodes + fixed and conditional edges.
//!
//! Declare the channels with `StateGraph::new`, add nodes with `add_node` /
//! `add_fn_node`, wire them with `add_edge(from, to)` (use `START` and `END` for
//! entry/exit) and `add_conditional_edges(from, router)`, then `compile` or
//! `compile_with_checkpointer` to get a `CompiledStateGraph`.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use crate::channels::Channel;
use crate::error::AgentError;
use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::{Branch, CompiledNode, CompiledStateGraph};
use crate::graph::node::{FnNode, Node};
use crate::graph::node_middleware::NodeMiddleware;
use crate::graph::router::Router;
use crate::memory::Checkpointer;
use crate::state::{Snapshot, Update};

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)`.
pub const END: &str = "__end__";

struct ConditionalEdge {
    from: String,
    router: Arc<dyn Router>,
    targets: Option<Vec<String>>,
}

/// State graph builder: channels, nodes, and edges.
///
/// Channels are fixed at construction, so they are always declared before any node.
/// Nodes keep their registration order; that order decides the merge order of a
/// step and the order in which a fan-out runs.
///
/// **Interaction**: Accepts `Arc<dyn Node>`; produces `CompiledStateGraph`. Middleware
/// set via `with_middleware` wraps every node call of the compiled graph.
pub struct StateGraph {
    channels: Vec<Channel>,
    nodes: Vec<(String, Arc<dyn Node>)>,
    edges: Vec<(String, String)>,
    conditional: Vec<ConditionalEdge>,
    middleware: Option<Arc<dyn NodeMiddleware>>,
}

impl StateGraph {
    /// Creates a graph over the given channels.
    pub fn new(channels: impl IntoIterator<Item = Channel>) -> Self {
        Self {
            channels: channels.into_iter().collect(),
            nodes: Vec::new(),
            edges: Vec::new(),
            conditional: Vec::new(),
            middleware: None,
        }
    }

    /// Adds a node. Names must be unique and must not be START or END; violations
    /// are reported by `compile()`.
    ///
    /// Returns `&mut Self` for method chaining.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node>) -> &mut Self {
        self.nodes.push((id.into(), node));
        self
    }

    /// Adds a node backed by an async closure over an owned snapshot.
    pub fn add_fn_node<F, Fut>(&mut self, id: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Snapshot) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Update, AgentError>> + Send + 'static,
    {
        self.add_node(id, Arc::new(FnNode::new(f)))
    }

    /// Adds a fixed edge from `from_id` to `to_id`.
    ///
    /// Use `START` for graph entry and `END` for graph exit. Several fixed edges from
    /// one node fan out: all targets run in the next step.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Adds a conditional edge: after `from_id` runs, `router` picks the next node(s)
    /// from the merged snapshot. Any registered node is an allowed destination.
    pub fn add_conditional_edges<R>(&mut self, from_id: impl Into<String>, router: R) -> &mut Self
    where
        R: Router + 'static,
    {
        self.conditional.push(ConditionalEdge {
            from: from_id.into(),
            router: Arc::new(router),
            targets: None,
        });
        self
    }

    /// Like `add_conditional_edges`, but restricts destinations to `targets` (END allowed).
    /// Targets are validated at compile; a router returning anything else fails the run
    /// with `UnknownNode`.
    pub fn add_conditional_edges_to<R, I, T>(
        &mut self,
        from_id: impl Into<String>,
        router: R,
        targets: I,
    ) -> &mut Self
    where
        R: Router + 'static,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.conditional.push(ConditionalEdge {
            from: from_id.into(),
            router: Arc::new(router),
            targets: Some(targets.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Wraps every node call of the compiled graph with `middleware`.
    pub fn with_middleware(&mut self, middleware: Arc<dyn NodeMiddleware>) -> &mut Self {
        self.middleware = Some(middleware);
        self
    }

    /// Builds the executable graph without persistence.
    pub fn compile(self) -> Result<CompiledStateGraph, CompilationError> {
        self.compile_internal(None)
    }

    /// Builds the executable graph with a checkpointer for persistence (thread_id in config).
    ///
    /// When `invoke(initial, config)` is called with `config.thread_id`, the latest
    /// checkpoint of the thread is the base state and a checkpoint is saved after every step.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer>,
    ) -> Result<CompiledStateGraph, CompilationError> {
        self.compile_internal(Some(checkpointer))
    }

    fn compile_internal(
        self,
        checkpointer: Option<Arc<dyn Checkpointer>>,
    ) -> Result<CompiledStateGraph, CompilationError> {
        let mut seen_channels = HashSet::new();
        for channel in &self.channels {
            if !seen_channels.insert(channel.key()) {
                return Err(CompilationError::DuplicateChannel(channel.key().to_string()));
            }
        }

        let mut nodes: HashMap<String, CompiledNode> = HashMap::new();
        for (order, (id, node)) in self.nodes.into_iter().enumerate() {
            if id == START || id == END {
                return Err(CompilationError::ReservedName(id));
            }
            if nodes.contains_key(&id) {
                return Err(CompilationError::DuplicateNode(id));
            }
            nodes.insert(
                id,
                CompiledNode {
                    node,
                    order,
                    edges: Vec::new(),
                    branches: Vec::new(),
                },
            );
        }

        let mut entry = None;
        for (from, to) in self.edges {
            if from == END {
                return Err(CompilationError::InvalidEdge(format!("edge out of END to {}", to)));
            }
            if to == START {
                return Err(CompilationError::InvalidEdge(format!("edge into START from {}", from)));
            }
            if to != END && !nodes.contains_key(&to) {
                return Err(CompilationError::NodeNotFound(to));
            }
            if from == START {
                if to == END || entry.replace(to).is_some() {
                    return Err(CompilationError::MissingStart);
                }
                continue;
            }
            let source = nodes
                .get_mut(&from)
                .ok_or_else(|| CompilationError::NodeNotFound(from.clone()))?;
            if !source.edges.contains(&to) {
                source.edges.push(to);
            }
        }
        let entry = entry.ok_or(CompilationError::MissingStart)?;

        for edge in self.conditional {
            if edge.from == START || edge.from == END {
                return Err(CompilationError::InvalidEdge(format!(
                    "conditional edge from {}",
                    edge.from
                )));
            }
            let targets = match edge.targets {
                Some(targets) => {
                    if let Some(missing) = targets
                        .iter()
                        .find(|t| t.as_str() != END && !nodes.contains_key(t.as_str()))
                    {
                        return Err(CompilationError::NodeNotFound(missing.clone()));
                    }
                    Some(targets.into_iter().collect::<HashSet<_>>())
                }
                None => None,
            };
            let source = nodes
                .get_mut(&edge.from)
                .ok_or_else(|| CompilationError::NodeNotFound(edge.from.clone()))?;
            source.branches.push(Branch {
                router: edge.router,
                targets,
            });
        }

        Ok(CompiledStateGraph {
            channels: Arc::from(self.channels),
            nodes: Arc::new(nodes),
            entry,
            checkpointer,
            middleware: self.middleware,
        })
    }
}
