//! Structured failure values for method execution.
//!
//! Method-level failures are data, not faults: they live inside
//! [`ComputationTrace`](crate::trace::ComputationTrace) entries and never
//! stop sibling layers, other parameters in the same pathway, or other
//! pathways.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a method-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// A required raw field or parameter slot is empty.
    MissingInput,
    /// A categorical input resolved to neither domain table.
    UnsupportedDomain,
    /// The callable returned a failure.
    MethodFailed,
    /// The result was NaN in mean or standard deviation.
    NumericalFailure,
    /// A record-level step could not run because a layer-level parameter is
    /// missing on some layer.
    MissingPrerequisite,
    /// No method is registered under this `(parameter, method)` pair.
    UnknownMethod,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::MissingInput => "missing input",
            FailureKind::UnsupportedDomain => "unsupported domain",
            FailureKind::MethodFailed => "method failed",
            FailureKind::NumericalFailure => "numerical failure",
            FailureKind::MissingPrerequisite => "missing prerequisite",
            FailureKind::UnknownMethod => "unknown method",
        };
        write!(f, "{}", s)
    }
}

/// A method-level failure with its classification and detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind}: {detail}")]
pub struct ExecFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl ExecFailure {
    pub fn missing_input(name: &str) -> Self {
        ExecFailure {
            kind: FailureKind::MissingInput,
            detail: format!("required input '{}' is not available", name),
        }
    }

    pub fn unsupported_domain(name: &str, value: &str) -> Self {
        ExecFailure {
            kind: FailureKind::UnsupportedDomain,
            detail: format!("input '{}' value '{}' is not in the method's domain", name, value),
        }
    }

    pub fn method_failed(reason: impl Into<String>) -> Self {
        ExecFailure {
            kind: FailureKind::MethodFailed,
            detail: reason.into(),
        }
    }

    pub fn numerical(parameter: &str, method: &str) -> Self {
        ExecFailure {
            kind: FailureKind::NumericalFailure,
            detail: format!("{}.{} returned NaN", parameter, method),
        }
    }

    pub fn missing_prerequisite(parameter: &str, layer_index: usize) -> Self {
        ExecFailure {
            kind: FailureKind::MissingPrerequisite,
            detail: format!("'{}' is missing on layer {}", parameter, layer_index),
        }
    }

    pub fn unknown_method(parameter: &str, method: &str) -> Self {
        ExecFailure {
            kind: FailureKind::UnknownMethod,
            detail: format!("no method '{}' registered for parameter '{}'", method, parameter),
        }
    }
}

/// Failure value returned by a method callable itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MethodFailure(pub String);

impl MethodFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        MethodFailure(reason.into())
    }
}
