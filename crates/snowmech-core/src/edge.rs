//! Edge labels for the parameter dependency graph.
//!
//! An edge either carries a value unchanged (`DataFlow`) or names the
//! calculation method that derives its target from its source (`Method`).
//! Two edges between the same pair of nodes with different method
//! identifiers are distinct alternatives.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label on a directed edge of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeLabel {
    /// Pass-through: the value moves from source to target without
    /// computation. All edges into merge nodes are data flow.
    DataFlow,
    /// A calculation method identified by name. Method edges always target
    /// parameter nodes.
    Method(String),
}

impl EdgeLabel {
    pub fn is_data_flow(&self) -> bool {
        matches!(self, EdgeLabel::DataFlow)
    }

    /// The method identifier, if this is a method edge.
    pub fn method(&self) -> Option<&str> {
        match self {
            EdgeLabel::DataFlow => None,
            EdgeLabel::Method(id) => Some(id),
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeLabel::DataFlow => write!(f, "data_flow"),
            EdgeLabel::Method(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_flow_has_no_method() {
        let e = EdgeLabel::DataFlow;
        assert!(e.is_data_flow());
        assert_eq!(e.method(), None);
        assert_eq!(e.to_string(), "data_flow");
    }

    #[test]
    fn method_edge_exposes_id() {
        let e = EdgeLabel::Method("bergfeld".into());
        assert!(!e.is_data_flow());
        assert_eq!(e.method(), Some("bergfeld"));
        assert_eq!(e.to_string(), "bergfeld");
    }

    #[test]
    fn serde_roundtrip() {
        for e in [EdgeLabel::DataFlow, EdgeLabel::Method("geldsetzer".into())] {
            let json = serde_json::to_string(&e).unwrap();
            let back: EdgeLabel = serde_json::from_str(&json).unwrap();
            assert_eq!(e, back);
        }
    }
}
