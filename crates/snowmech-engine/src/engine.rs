//! The high-level execution engine.
//!
//! [`Engine`] ties a sealed graph to a method registry. `execute_all`
//! enumerates every derivation of a target parameter, executes each one
//! against the input slab, and aggregates per-pathway results with cache
//! statistics. The per-run cache is created at the start of each call and
//! dropped at its end; the only state the engine keeps across calls is the
//! per-target derivation memo, which is a pure function of the sealed graph.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::info;

use snowmech_core::enumerate::{enumerate_derivations, Derivation};
use snowmech_core::graph::ParamGraph;
use snowmech_core::record::Slab;

use crate::cache::ComputationCache;
use crate::config::ExecutionConfig;
use crate::error::EngineError;
use crate::executor::{pathway_description, PathwayExecutor};
use crate::registry::MethodRegistry;
use crate::results::{ExecutionResults, PathwayResult};

/// Summary of one available pathway, as returned by
/// [`Engine::list_pathways`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwaySummary {
    pub id: String,
    pub description: String,
    pub methods: BTreeMap<String, String>,
}

/// Execution engine over a sealed graph and a method registry.
pub struct Engine {
    graph: Arc<ParamGraph>,
    registry: Arc<MethodRegistry>,
    /// Lazily computed, write-once-per-target derivation lists.
    derivations: Mutex<HashMap<String, Arc<Vec<Derivation>>>>,
}

impl Engine {
    pub fn new(graph: ParamGraph, registry: MethodRegistry) -> Self {
        Engine {
            graph: Arc::new(graph),
            registry: Arc::new(registry),
            derivations: Mutex::new(HashMap::new()),
        }
    }

    pub fn graph(&self) -> &ParamGraph {
        &self.graph
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    fn derivations_for(&self, target: &str) -> Result<Arc<Vec<Derivation>>, EngineError> {
        let node_id = self
            .graph
            .node_id(target)
            .ok_or_else(|| EngineError::UnknownTarget {
                name: target.to_string(),
            })?;
        let node = self
            .graph
            .node(node_id)
            .ok_or_else(|| EngineError::UnknownTarget {
                name: target.to_string(),
            })?;
        if node.is_merge() {
            return Err(EngineError::NotAParameter {
                name: target.to_string(),
            });
        }

        let mut memo = self
            .derivations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(derivs) = memo.get(target) {
            return Ok(Arc::clone(derivs));
        }
        let derivs = Arc::new(enumerate_derivations(&self.graph, node_id));
        memo.insert(target.to_string(), Arc::clone(&derivs));
        Ok(derivs)
    }

    /// Executes every pathway to `target` against `slab`.
    ///
    /// The input slab is never mutated; each pathway result carries its own
    /// copy-on-write record. Method-level failures stay inside traces --
    /// the only faults here are an unknown or non-parameter target.
    pub fn execute_all(
        &self,
        slab: &Slab,
        target: &str,
        config: &ExecutionConfig,
    ) -> Result<ExecutionResults, EngineError> {
        let derivations = self.derivations_for(target)?;
        let mut cache = ComputationCache::new();
        let executor = PathwayExecutor::new(&self.graph, &self.registry, config);

        let mut pathways = BTreeMap::new();
        for (idx, derivation) in derivations.iter().enumerate() {
            if config.verbose {
                info!(
                    pathway = idx + 1,
                    total = derivations.len(),
                    target,
                    "executing pathway"
                );
            }
            let result = executor.execute(slab, derivation, target, &mut cache);
            pathways.insert(result.description.clone(), result);
        }

        let total = pathways.len();
        let successful = pathways.values().filter(|p| p.success).count();
        Ok(ExecutionResults {
            target_parameter: target.to_string(),
            source_slab: slab.clone(),
            pathways,
            total,
            successful,
            failed: total - successful,
            cache_stats: cache.stats().clone(),
        })
    }

    /// Executes the single pathway matching an explicit method map.
    ///
    /// Matching is by subset: every requested `(parameter, method)` pair
    /// must agree with the derivation's map; the first enumerated match
    /// runs. Fails with `NoSuchPathway` when nothing matches.
    pub fn execute_single(
        &self,
        slab: &Slab,
        target: &str,
        methods: &BTreeMap<String, String>,
        config: &ExecutionConfig,
    ) -> Result<PathwayResult, EngineError> {
        let derivations = self.derivations_for(target)?;
        let derivation = derivations
            .iter()
            .find(|d| {
                methods
                    .iter()
                    .all(|(p, m)| d.methods.get(p) == Some(m))
            })
            .ok_or_else(|| EngineError::NoSuchPathway {
                target: target.to_string(),
            })?;

        let mut cache = ComputationCache::new();
        let executor = PathwayExecutor::new(&self.graph, &self.registry, config);
        Ok(executor.execute(slab, derivation, target, &mut cache))
    }

    /// Lists every available pathway to `target` without executing.
    pub fn list_pathways(&self, target: &str) -> Result<Vec<PathwaySummary>, EngineError> {
        let derivations = self.derivations_for(target)?;
        Ok(derivations
            .iter()
            .map(|d| PathwaySummary {
                id: d.fingerprint.clone(),
                description: pathway_description(&d.methods),
                methods: d.methods.clone(),
            })
            .collect())
    }
}
