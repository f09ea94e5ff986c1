//! Single-pathway execution.
//!
//! [`PathwayExecutor`] walks one derivation against one slab: it derives a
//! topological execution order over the layer-level parameters from the
//! derivation tree, computes each parameter on each layer (consulting the
//! cache for cacheable parameters), applies the copy-on-write rule per
//! layer, and finally computes the slab-level target if there is one.
//!
//! The input slab is never mutated. A working copy of each layer is taken
//! up front; if no step writes to it, the result slab keeps sharing the
//! input's layer allocation.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use snowmech_core::enumerate::{leveled_dependencies, Derivation};
use snowmech_core::graph::ParamGraph;
use snowmech_core::node::Level;
use snowmech_core::record::{Layer, Slab};

use crate::cache::ComputationCache;
use crate::config::ExecutionConfig;
use crate::failure::ExecFailure;
use crate::registry::{ExecutionContext, MethodRegistry};
use crate::results::PathwayResult;
use crate::trace::ComputationTrace;

/// Human-readable pathway description: `"param=method | param=method"` over
/// the sorted method map. Unique per run because fingerprints are unique.
pub(crate) fn pathway_description(methods: &BTreeMap<String, String>) -> String {
    methods
        .iter()
        .map(|(p, m)| format!("{}={}", p, m))
        .collect::<Vec<_>>()
        .join(" | ")
}

pub(crate) struct PathwayExecutor<'a> {
    graph: &'a ParamGraph,
    registry: &'a MethodRegistry,
    config: &'a ExecutionConfig,
}

impl<'a> PathwayExecutor<'a> {
    pub fn new(
        graph: &'a ParamGraph,
        registry: &'a MethodRegistry,
        config: &'a ExecutionConfig,
    ) -> Self {
        PathwayExecutor {
            graph,
            registry,
            config,
        }
    }

    /// Executes one derivation, accumulating traces in execution order.
    pub fn execute(
        &self,
        slab: &Slab,
        derivation: &Derivation,
        target: &str,
        cache: &mut ComputationCache,
    ) -> PathwayResult {
        let methods = &derivation.methods;
        let description = pathway_description(methods);
        let order = self.layer_execution_order(derivation);
        let flags = self.config.flags();

        let mut result_slab = slab.clone();
        let mut traces: Vec<ComputationTrace> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        // Layer-level steps, per layer, in dependency order.
        for (i, layer_arc) in slab.layers().iter().enumerate() {
            let mut working = Layer::clone(layer_arc);
            let mut wrote = false;

            for parameter in &order {
                let method = &methods[parameter];
                let cacheable = self.graph.is_cacheable(parameter);

                if cacheable {
                    if let Some(value) = cache.get(i, parameter, method) {
                        working.set_computed(parameter.clone(), value);
                        wrote = true;
                        traces.push(ComputationTrace::cached(parameter, method, i, value));
                        continue;
                    }
                }

                let outcome = self.registry.execute(
                    parameter,
                    method,
                    ExecutionContext::Layer(&working),
                    flags,
                );
                for warning in outcome.warnings {
                    if !warnings.contains(&warning) {
                        warnings.push(warning);
                    }
                }
                if let Some(value) = outcome.value {
                    if cacheable {
                        cache.put(i, parameter, method, value);
                    }
                    working.set_computed(parameter.clone(), value);
                    wrote = true;
                }
                traces.push(ComputationTrace {
                    parameter: parameter.clone(),
                    method_id: method.clone(),
                    layer_index: Some(i),
                    success: outcome.value.is_some(),
                    cached: false,
                    output: outcome.value,
                    failure: outcome.failure,
                    input_summary: outcome.input_summary,
                });
            }

            if wrote {
                result_slab.replace_layer(i, working);
            }
        }

        // Slab-level step: only the target, never its siblings.
        if self.graph.level_of(target) == Some(Level::Slab) {
            if let Some(method) = methods.get(target) {
                match self.first_missing_prerequisite(&result_slab, &order) {
                    Some((parameter, layer_index)) => {
                        debug!(
                            target_parameter = target,
                            parameter = parameter.as_str(),
                            layer_index,
                            "skipping slab-level step: prerequisite missing"
                        );
                        traces.push(ComputationTrace {
                            parameter: target.to_string(),
                            method_id: method.clone(),
                            layer_index: None,
                            success: false,
                            cached: false,
                            output: None,
                            failure: Some(ExecFailure::missing_prerequisite(
                                &parameter,
                                layer_index,
                            )),
                            input_summary: BTreeMap::new(),
                        });
                    }
                    None => {
                        let outcome = self.registry.execute(
                            target,
                            method,
                            ExecutionContext::Slab(&result_slab),
                            flags,
                        );
                        for warning in outcome.warnings {
                            if !warnings.contains(&warning) {
                                warnings.push(warning);
                            }
                        }
                        if let Some(value) = outcome.value {
                            result_slab.set_computed(target, value);
                        }
                        traces.push(ComputationTrace {
                            parameter: target.to_string(),
                            method_id: method.clone(),
                            layer_index: None,
                            success: outcome.value.is_some(),
                            cached: false,
                            output: outcome.value,
                            failure: outcome.failure,
                            input_summary: outcome.input_summary,
                        });
                    }
                }
            }
        }

        let success = traces
            .iter()
            .any(|t| t.parameter == target && t.success);

        PathwayResult {
            id: derivation.fingerprint.clone(),
            description,
            methods: methods.clone(),
            slab: result_slab,
            traces,
            success,
            warnings,
        }
    }

    /// Topological order over the layer-level parameters of the derivation,
    /// derived from subtree containment, with ties broken by parameter name.
    fn layer_execution_order(&self, derivation: &Derivation) -> Vec<String> {
        let layer_params: BTreeSet<String> = derivation
            .methods
            .keys()
            .filter(|p| self.graph.level_of(p) == Some(Level::Layer))
            .cloned()
            .collect();

        let deps_all = leveled_dependencies(self.graph, &derivation.tree);
        let mut remaining: BTreeMap<String, BTreeSet<String>> = layer_params
            .iter()
            .map(|p| {
                let deps = deps_all
                    .get(p)
                    .map(|d| {
                        d.iter()
                            .filter(|q| layer_params.contains(*q))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                (p.clone(), deps)
            })
            .collect();

        let mut order = Vec::with_capacity(remaining.len());
        // BTreeMap iteration makes the name tie-break deterministic; the
        // sealed graph is acyclic, so this always drains.
        while let Some(next) = remaining
            .iter()
            .find(|(_, deps)| deps.is_empty())
            .map(|(name, _)| name.clone())
        {
            remaining.remove(&next);
            for deps in remaining.values_mut() {
                deps.remove(&next);
            }
            order.push(next);
        }
        order
    }

    /// First `(parameter, layer_index)` whose computed slot is empty, if any.
    fn first_missing_prerequisite(
        &self,
        slab: &Slab,
        layer_params: &[String],
    ) -> Option<(String, usize)> {
        for (i, layer) in slab.layers().iter().enumerate() {
            for parameter in layer_params {
                if layer.computed(parameter).is_none() {
                    return Some((parameter.clone(), i));
                }
            }
        }
        None
    }
}
