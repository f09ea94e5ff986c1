//! Core data model for the snowmech parameterization engine.
//!
//! This crate holds everything that is independent of method execution:
//!
//! - the parameter dependency graph ([`graph::GraphBuilder`],
//!   [`graph::ParamGraph`]) with its two node kinds (OR-logic parameters,
//!   AND-logic merges) and two edge labels (data flow, method);
//! - backward enumeration of derivation trees with memoization and method
//!   fingerprint deduplication ([`enumerate`]);
//! - uncertainty-carrying scalars ([`uncertain::UncertainValue`]);
//! - the layer/slab record types with copy-on-write layer sharing
//!   ([`record`]).
//!
//! The engine crate drives these against a method registry; this crate never
//! executes anything.

pub mod edge;
pub mod enumerate;
pub mod error;
pub mod graph;
pub mod id;
pub mod node;
pub mod record;
pub mod uncertain;

pub use edge::EdgeLabel;
pub use enumerate::{enumerate_derivations, Derivation, DerivationTree};
pub use error::GraphError;
pub use graph::{GraphBuilder, ParamGraph};
pub use id::NodeId;
pub use node::{Level, NodeKind, ParamNode};
pub use record::{FieldValue, Layer, Slab};
pub use uncertain::UncertainValue;
