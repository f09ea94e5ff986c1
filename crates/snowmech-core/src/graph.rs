//! The parameter dependency graph: builder and sealed container.
//!
//! [`GraphBuilder`] assembles nodes and edges, enforcing the label rules at
//! insertion time (edges into merges are data flow, merge outputs are method
//! edges, method identifiers are unique per target). [`GraphBuilder::seal`]
//! verifies the whole-graph invariants -- acyclicity, a unique source node,
//! merge arity, backward reachability -- and produces an immutable
//! [`ParamGraph`].
//!
//! Sealing consumes the builder, so mutation of a sealed graph is ruled out
//! by the type system rather than a runtime flag. Every downstream operation
//! (enumeration, execution) takes `&ParamGraph` and is read-only.

use std::collections::{BTreeSet, HashMap, VecDeque};

use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use petgraph::{algo, Directed, Direction};
use serde::{Deserialize, Serialize};

use crate::edge::EdgeLabel;
use crate::error::GraphError;
use crate::id::NodeId;
use crate::node::{Level, NodeKind, ParamNode};

/// Fluent builder for [`ParamGraph`].
///
/// Node-creation methods return the new [`NodeId`] so edges can be wired up
/// without name lookups:
///
/// ```
/// use snowmech_core::graph::GraphBuilder;
/// use snowmech_core::node::Level;
///
/// let mut b = GraphBuilder::new();
/// let pit = b.param("snow_pit").unwrap();
/// let measured = b.param("measured_density").unwrap();
/// let density = b.param_leveled("density", Level::Layer).unwrap();
/// b.flow(pit, measured).unwrap();
/// b.method(measured, density, "direct").unwrap();
/// let graph = b.seal().unwrap();
/// assert_eq!(graph.node_count(), 3);
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: StableGraph<ParamNode, EdgeLabel, Directed, u32>,
    names: HashMap<String, NodeId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        GraphBuilder {
            graph: StableGraph::new(),
            names: HashMap::new(),
        }
    }

    fn add_node(&mut self, node: ParamNode) -> Result<NodeId, GraphError> {
        if self.names.contains_key(&node.name) {
            return Err(GraphError::DuplicateName { name: node.name });
        }
        let name = node.name.clone();
        let id = NodeId::from(self.graph.add_node(node));
        self.names.insert(name, id);
        Ok(id)
    }

    /// Adds an unleveled parameter node (source or measured input).
    pub fn param(&mut self, name: impl Into<String>) -> Result<NodeId, GraphError> {
        self.add_node(ParamNode::parameter(name, None))
    }

    /// Adds a parameter node computed at the given level.
    pub fn param_leveled(
        &mut self,
        name: impl Into<String>,
        level: Level,
    ) -> Result<NodeId, GraphError> {
        self.add_node(ParamNode::parameter(name, Some(level)))
    }

    /// Adds a merge node.
    pub fn merge(&mut self, name: impl Into<String>) -> Result<NodeId, GraphError> {
        self.add_node(ParamNode::merge(name))
    }

    /// Opts a parameter node into the per-run computation cache.
    ///
    /// Only tag parameters whose value does not depend on downstream method
    /// choices; see the engine crate's cache documentation for the
    /// uncertainty-independence argument.
    pub fn mark_cacheable(&mut self, name: &str) -> Result<(), GraphError> {
        let id = *self
            .names
            .get(name)
            .ok_or_else(|| GraphError::UnknownNode { name: name.into() })?;
        let node = self
            .graph
            .node_weight_mut(id.into())
            .ok_or_else(|| GraphError::UnknownNode { name: name.into() })?;
        match &mut node.kind {
            NodeKind::Parameter { cacheable, .. } => {
                *cacheable = true;
                Ok(())
            }
            NodeKind::Merge => Err(GraphError::InvalidEdge {
                reason: format!("merge node '{}' cannot be cacheable", name),
            }),
        }
    }

    fn node_name(&self, id: NodeId) -> Result<&ParamNode, GraphError> {
        self.graph
            .node_weight(id.into())
            .ok_or_else(|| GraphError::MissingNode {
                name: format!("#{}", id),
            })
    }

    /// Adds a data flow edge.
    ///
    /// Fails with `InvalidEdge` when the source is a merge node: merge
    /// outputs always carry a method identifier.
    pub fn flow(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        let src = self.node_name(from)?;
        self.node_name(to)?;
        if src.is_merge() {
            return Err(GraphError::InvalidEdge {
                reason: format!(
                    "outgoing edge from merge node '{}' must carry a method identifier",
                    src.name
                ),
            });
        }
        self.graph.add_edge(from.into(), to.into(), EdgeLabel::DataFlow);
        Ok(())
    }

    /// Adds a method edge.
    ///
    /// The target must be a parameter node, and the method identifier must
    /// not already be in use on another edge into the same target.
    pub fn method(
        &mut self,
        from: NodeId,
        to: NodeId,
        method_id: impl Into<String>,
    ) -> Result<(), GraphError> {
        let method_id = method_id.into();
        self.node_name(from)?;
        let target = self.node_name(to)?;
        if target.is_merge() {
            return Err(GraphError::InvalidEdge {
                reason: format!(
                    "incoming edge to merge node '{}' must be data flow",
                    target.name
                ),
            });
        }
        let target_name = target.name.clone();
        let duplicate = self
            .graph
            .edges_directed(to.into(), Direction::Incoming)
            .any(|e| e.weight().method() == Some(method_id.as_str()));
        if duplicate {
            return Err(GraphError::DuplicateMethod {
                target: target_name,
                method: method_id,
            });
        }
        self.graph
            .add_edge(from.into(), to.into(), EdgeLabel::Method(method_id));
        Ok(())
    }

    /// Verifies the whole-graph invariants and freezes the graph.
    ///
    /// Checks, in order: acyclicity (topological sort), a unique source node
    /// that is an unleveled parameter, merge in-degree of at least two, and
    /// backward reachability of every node from some leveled parameter.
    pub fn seal(self) -> Result<ParamGraph, GraphError> {
        let GraphBuilder { graph, names } = self;

        if let Err(cycle) = algo::toposort(&graph, None) {
            let name = graph
                .node_weight(cycle.node_id())
                .map(|n| n.name.clone())
                .unwrap_or_default();
            return Err(GraphError::GraphCycle { name });
        }

        let mut source = None;
        for idx in graph.node_indices() {
            let node = &graph[idx];
            if graph
                .edges_directed(idx, Direction::Incoming)
                .next()
                .is_none()
            {
                match source {
                    None => source = Some(NodeId::from(idx)),
                    Some(first) => {
                        return Err(GraphError::MultipleSourceNodes {
                            first: graph[petgraph::graph::NodeIndex::from(first)].name.clone(),
                            second: node.name.clone(),
                        })
                    }
                }
            }
            if node.is_merge() {
                let arity = graph.edges_directed(idx, Direction::Incoming).count();
                if arity < 2 {
                    return Err(GraphError::MergeArity {
                        name: node.name.clone(),
                        found: arity,
                    });
                }
            }
        }
        let source = source.ok_or(GraphError::NoSourceNode)?;
        let source_node = &graph[petgraph::graph::NodeIndex::from(source)];
        if !source_node.is_parameter() || source_node.level().is_some() {
            return Err(GraphError::InvalidEdge {
                reason: format!(
                    "source node '{}' must be an unleveled parameter",
                    source_node.name
                ),
            });
        }

        let mut layer_params = BTreeSet::new();
        let mut slab_params = BTreeSet::new();
        let mut reach: VecDeque<petgraph::graph::NodeIndex<u32>> = VecDeque::new();
        let mut visited = BTreeSet::new();
        for idx in graph.node_indices() {
            match graph[idx].level() {
                Some(Level::Layer) => {
                    layer_params.insert(graph[idx].name.clone());
                }
                Some(Level::Slab) => {
                    slab_params.insert(graph[idx].name.clone());
                }
                None => continue,
            }
            if visited.insert(idx.index()) {
                reach.push_back(idx);
            }
        }
        while let Some(idx) = reach.pop_front() {
            for e in graph.edges_directed(idx, Direction::Incoming) {
                if visited.insert(e.source().index()) {
                    reach.push_back(e.source());
                }
            }
        }
        for idx in graph.node_indices() {
            if !visited.contains(&idx.index()) {
                return Err(GraphError::UnreachableNode {
                    name: graph[idx].name.clone(),
                });
            }
        }

        Ok(ParamGraph {
            graph,
            names,
            source,
            layer_params,
            slab_params,
        })
    }
}

/// The sealed, immutable parameter dependency graph.
///
/// Shared read-only by every enumeration and execution; all accessors take
/// `&self`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamGraph {
    graph: StableGraph<ParamNode, EdgeLabel, Directed, u32>,
    names: HashMap<String, NodeId>,
    source: NodeId,
    layer_params: BTreeSet<String>,
    slab_params: BTreeSet<String>,
}

impl ParamGraph {
    /// The distinguished source node (the input record root).
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Looks up a node id by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&ParamNode> {
        self.graph.node_weight(id.into())
    }

    /// Looks up a node by name, failing with `UnknownNode`.
    pub fn get_node(&self, name: &str) -> Result<&ParamNode, GraphError> {
        self.node_id(name)
            .and_then(|id| self.node(id))
            .ok_or_else(|| GraphError::UnknownNode { name: name.into() })
    }

    /// Incoming edges of a node as `(source, label)` pairs, in insertion
    /// order.
    pub fn incoming(&self, id: NodeId) -> Vec<(NodeId, EdgeLabel)> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(id.into(), Direction::Incoming)
            .map(|e| (NodeId::from(e.source()), e.weight().clone()))
            .collect();
        edges.reverse();
        edges
    }

    /// Outgoing edges of a node as `(target, label)` pairs, in insertion
    /// order.
    pub fn outgoing(&self, id: NodeId) -> Vec<(NodeId, EdgeLabel)> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(id.into(), Direction::Outgoing)
            .map(|e| (NodeId::from(e.target()), e.weight().clone()))
            .collect();
        edges.reverse();
        edges
    }

    /// Names of all parameter nodes tagged with the given level, sorted.
    pub fn parameters_by_level(&self, level: Level) -> &BTreeSet<String> {
        match level {
            Level::Layer => &self.layer_params,
            Level::Slab => &self.slab_params,
        }
    }

    /// The level of a named parameter, if it has one.
    pub fn level_of(&self, name: &str) -> Option<Level> {
        self.node_id(name)
            .and_then(|id| self.node(id))
            .and_then(|n| n.level())
    }

    /// Whether the named parameter is opted into the computation cache.
    pub fn is_cacheable(&self, name: &str) -> bool {
        self.node_id(name)
            .and_then(|id| self.node(id))
            .map(|n| n.is_cacheable())
            .unwrap_or(false)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
