//! Fault-level errors for the execution engine.
//!
//! These are programmer errors surfaced immediately, as opposed to the
//! method-level failures in [`crate::failure`], which are recoverable values
//! inside traces.

use thiserror::Error;

/// Errors returned by [`Engine`](crate::engine::Engine) entry points and
/// registry construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The target parameter is not a node of the graph.
    #[error("unknown target parameter: '{name}'")]
    UnknownTarget { name: String },

    /// The target names a merge node, which cannot be executed.
    #[error("target '{name}' is not a parameter node")]
    NotAParameter { name: String },

    /// `execute_single` was given a method map that matches no enumerated
    /// derivation.
    #[error("no pathway to '{target}' matches the requested methods")]
    NoSuchPathway { target: String },

    /// A second spec was registered under the same `(parameter, method)`.
    #[error("method '{method}' already registered for parameter '{parameter}'")]
    DuplicateMethod { parameter: String, method: String },
}
