//! Node types for the parameter dependency graph.
//!
//! A node is either a *parameter* (a measured or calculated quantity, OR
//! logic: any one incoming edge can produce it) or a *merge* (a combination
//! of inputs consumed together by a downstream method, AND logic: all
//! incoming edges are required).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a calculated parameter lives on each layer or on the whole slab.
///
/// Parameter nodes without a level are structural: the source node and the
/// measured input nodes that flow out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Layer,
    Slab,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Layer => write!(f, "layer"),
            Level::Slab => write!(f, "slab"),
        }
    }
}

/// The two node kinds of the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// OR logic: each incoming edge is an alternative way to produce the value.
    ///
    /// `cacheable` opts the parameter into the per-run computation cache.
    /// Only parameters whose value is independent of downstream method
    /// choices may be tagged (see the engine crate's cache documentation).
    Parameter {
        level: Option<Level>,
        cacheable: bool,
    },
    /// AND logic: all incoming edges feed a combined input tuple.
    Merge,
}

/// A node in the parameter dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamNode {
    pub name: String,
    pub kind: NodeKind,
}

impl ParamNode {
    pub fn parameter(name: impl Into<String>, level: Option<Level>) -> Self {
        ParamNode {
            name: name.into(),
            kind: NodeKind::Parameter {
                level,
                cacheable: false,
            },
        }
    }

    pub fn merge(name: impl Into<String>) -> Self {
        ParamNode {
            name: name.into(),
            kind: NodeKind::Merge,
        }
    }

    pub fn is_merge(&self) -> bool {
        matches!(self.kind, NodeKind::Merge)
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self.kind, NodeKind::Parameter { .. })
    }

    /// The level tag, if this is a leveled parameter node.
    pub fn level(&self) -> Option<Level> {
        match self.kind {
            NodeKind::Parameter { level, .. } => level,
            NodeKind::Merge => None,
        }
    }

    pub fn is_cacheable(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Parameter {
                cacheable: true,
                ..
            }
        )
    }
}
