//! Execution trace recording.
//!
//! The executor records a [`ComputationTrace`] for every method step it
//! attempts, in execution order: layer steps carry their layer index, the
//! slab-level step carries none. Failures are embedded as structured
//! values so callers can match on the failure kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use snowmech_core::uncertain::UncertainValue;

use crate::failure::ExecFailure;

/// A record of one call site in a pathway execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationTrace {
    /// Target parameter of the step.
    pub parameter: String,
    /// Method attempted.
    pub method_id: String,
    /// Layer index for layer-level steps; `None` for the slab-level step.
    pub layer_index: Option<usize>,
    pub success: bool,
    /// True if the value came from the computation cache.
    pub cached: bool,
    pub output: Option<UncertainValue>,
    pub failure: Option<ExecFailure>,
    /// Resolved input names to display-formatted values.
    pub input_summary: BTreeMap<String, String>,
}

impl ComputationTrace {
    /// A trace for a cache hit.
    pub(crate) fn cached(
        parameter: &str,
        method_id: &str,
        layer_index: usize,
        value: UncertainValue,
    ) -> Self {
        ComputationTrace {
            parameter: parameter.to_string(),
            method_id: method_id.to_string(),
            layer_index: Some(layer_index),
            success: true,
            cached: true,
            output: Some(value),
            failure: None,
            input_summary: BTreeMap::new(),
        }
    }
}
