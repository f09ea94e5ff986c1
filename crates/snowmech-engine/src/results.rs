//! Result containers for pathway execution.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use snowmech_core::record::Slab;

use crate::cache::CacheStats;
use crate::trace::ComputationTrace;

/// Outcome of executing a single pathway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwayResult {
    /// Stable identifier: the sorted `"param:method"` fingerprint.
    pub id: String,
    /// Human-readable description, unique within a run.
    pub description: String,
    /// Parameter -> method actually used.
    pub methods: BTreeMap<String, String>,
    /// Result record: a copy of the input with computed slots filled where
    /// possible. Shares unmodified layers with the input slab.
    pub slab: Slab,
    /// One entry per attempted step, in execution order.
    pub traces: Vec<ComputationTrace>,
    /// True iff at least one trace for the target parameter succeeded.
    pub success: bool,
    /// Non-fatal notes (e.g. categorical inputs resolved via the
    /// general-prefix fallback).
    pub warnings: Vec<String>,
}

impl PathwayResult {
    /// Traces restricted to one parameter.
    pub fn traces_for<'a>(
        &'a self,
        parameter: &'a str,
    ) -> impl Iterator<Item = &'a ComputationTrace> + 'a {
        self.traces.iter().filter(move |t| t.parameter == parameter)
    }
}

/// Aggregate outcome of `execute_all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResults {
    pub target_parameter: String,
    /// The unmodified input record.
    pub source_slab: Slab,
    /// Pathway results keyed by description.
    pub pathways: BTreeMap<String, PathwayResult>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub cache_stats: CacheStats,
}

impl ExecutionResults {
    /// Only the pathways that succeeded.
    pub fn successful_pathways(&self) -> impl Iterator<Item = (&String, &PathwayResult)> {
        self.pathways.iter().filter(|(_, p)| p.success)
    }

    /// Finds a pathway by its stable id.
    pub fn pathway_by_id(&self, id: &str) -> Option<&PathwayResult> {
        self.pathways.values().find(|p| p.id == id)
    }

    /// All methods used for each parameter across pathways.
    pub fn methods_used_by_parameter(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut out: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for result in self.pathways.values() {
            for (parameter, method) in &result.methods {
                out.entry(parameter.clone())
                    .or_default()
                    .insert(method.clone());
            }
        }
        out
    }
}
