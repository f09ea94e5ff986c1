//! Core error types for snowmech-core.
//!
//! Uses `thiserror` for structured, matchable error variants. All graph
//! construction errors are fatal: they surface while the builder is assembling
//! or sealing the graph, never during enumeration or execution.

use thiserror::Error;

/// Errors produced while building or sealing a parameter graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A node with this name already exists.
    #[error("duplicate node name: '{name}'")]
    DuplicateName { name: String },

    /// An edge endpoint refers to a node that is not in the graph.
    #[error("missing node: '{name}'")]
    MissingNode { name: String },

    /// A node lookup by name failed.
    #[error("unknown node: '{name}'")]
    UnknownNode { name: String },

    /// An edge violates the kind-to-label rules.
    #[error("invalid edge: {reason}")]
    InvalidEdge { reason: String },

    /// A second method edge with the same identifier targets this parameter.
    #[error("duplicate method '{method}' for parameter '{target}'")]
    DuplicateMethod { target: String, method: String },

    /// The graph contains a cycle through this node.
    #[error("graph contains a cycle through node '{name}'")]
    GraphCycle { name: String },

    /// No source node (parameter with in-degree zero) exists.
    #[error("graph has no source node")]
    NoSourceNode,

    /// More than one node has in-degree zero.
    #[error("graph has multiple source nodes: '{first}', '{second}'")]
    MultipleSourceNodes { first: String, second: String },

    /// A non-source node cannot reach any leveled parameter node.
    #[error("node '{name}' feeds no leveled parameter")]
    UnreachableNode { name: String },

    /// A merge node has fewer than two incoming edges.
    #[error("merge node '{name}' has {found} incoming edge(s), needs at least 2")]
    MergeArity { name: String, found: usize },
}
