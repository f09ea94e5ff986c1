//! Execution configuration.

use serde::{Deserialize, Serialize};

use crate::registry::MethodFlags;

/// Controls execution behavior for a single `execute_all`/`execute_single`
/// call. The engine finds all pathways and resolves dependencies on its own;
/// the config only tunes how methods run and how chatty the run is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Whether methods should include their inherent uncertainty (e.g. a
    /// regression standard error) on top of propagated input uncertainty.
    pub include_method_uncertainty: bool,
    /// Emit per-pathway progress via `tracing`.
    pub verbose: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            include_method_uncertainty: true,
            verbose: false,
        }
    }
}

impl ExecutionConfig {
    pub(crate) fn flags(&self) -> MethodFlags {
        MethodFlags {
            include_method_uncertainty: self.include_method_uncertainty,
        }
    }
}
