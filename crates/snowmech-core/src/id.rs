//! Node handles for the parameter dependency graph.
//!
//! A [`NodeId`] is the opaque handle the builder returns for every node it
//! creates and the only way derivation trees refer back into the graph:
//! trees own their shape, but node identity stays an index into the sealed
//! graph's node array rather than an owning pointer. Internally it bridges
//! to petgraph's `NodeIndex<u32>`; the wrapper keeps petgraph out of the
//! public API and makes a node handle orderable and serializable alongside
//! the rest of the data model.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Handle to one node of a [`ParamGraph`](crate::graph::ParamGraph).
///
/// Ids are assigned in creation order and never change once the graph is
/// sealed, so they are stable across enumeration runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NodeIndex<u32>> for NodeId {
    fn from(idx: NodeIndex<u32>) -> Self {
        NodeId(idx.index() as u32)
    }
}

impl From<NodeId> for NodeIndex<u32> {
    fn from(id: NodeId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}
