//! The method registry: binding `(parameter, method)` pairs to callables.
//!
//! A [`MethodSpec`] describes one calculation method: its target parameter,
//! level, required inputs, optional categorical domain tables, and the
//! callable itself. [`MethodRegistry::execute`] prepares inputs from a layer
//! or slab, applies domain resolution, invokes the callable, and converts
//! every failure mode into a structured [`MethodOutcome`] -- it never
//! panics and never aborts sibling work.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use snowmech_core::node::Level;
use snowmech_core::record::{FieldValue, Layer, Slab};
use snowmech_core::uncertain::UncertainValue;

use crate::error::EngineError;
use crate::failure::{ExecFailure, MethodFailure};

/// Flags passed through to method callables.
#[derive(Debug, Clone, Copy)]
pub struct MethodFlags {
    /// Include the method's inherent uncertainty (regression SE etc.) in the
    /// result. Methods that do not support the mode ignore this.
    pub include_method_uncertainty: bool,
}

impl Default for MethodFlags {
    fn default() -> Self {
        MethodFlags {
            include_method_uncertainty: true,
        }
    }
}

/// Two-tier vocabulary table for one categorical input.
///
/// Resolution: a raw code in the `specific` set (or already an exact member
/// of the `general` set) is used as-is; otherwise its `prefix_len`-character
/// prefix is used if it is in the `general` set, which drops detail and is
/// reported as a pathway warning; otherwise the code is unresolved and the
/// callable is not invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainTable {
    pub specific: BTreeSet<String>,
    pub general: BTreeSet<String>,
    pub prefix_len: usize,
}

impl DomainTable {
    pub fn new(
        specific: impl IntoIterator<Item = impl Into<String>>,
        general: impl IntoIterator<Item = impl Into<String>>,
        prefix_len: usize,
    ) -> Self {
        DomainTable {
            specific: specific.into_iter().map(Into::into).collect(),
            general: general.into_iter().map(Into::into).collect(),
            prefix_len,
        }
    }

    pub fn resolve(&self, raw: &str) -> DomainResolution {
        if self.specific.contains(raw) || self.general.contains(raw) {
            return DomainResolution::Specific(raw.to_string());
        }
        if let Some(prefix) = raw.get(0..self.prefix_len) {
            if self.general.contains(prefix) {
                return DomainResolution::General(prefix.to_string());
            }
        }
        DomainResolution::Unresolved
    }
}

/// Result of resolving a categorical code against a [`DomainTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainResolution {
    /// The raw code matched the specific set.
    Specific(String),
    /// The prefix fallback matched the general set.
    General(String),
    /// Neither tier matched.
    Unresolved,
}

/// Inputs handed to a method callable after resolution.
#[derive(Debug, Default)]
pub struct ResolvedInputs<'a> {
    scalars: BTreeMap<String, UncertainValue>,
    codes: BTreeMap<String, String>,
    /// The whole slab, present for slab-level methods that aggregate over
    /// layers.
    pub slab: Option<&'a Slab>,
}

impl<'a> ResolvedInputs<'a> {
    pub fn scalar(&self, name: &str) -> Option<UncertainValue> {
        self.scalars.get(name).copied()
    }

    pub fn code(&self, name: &str) -> Option<&str> {
        self.codes.get(name).map(String::as_str)
    }

    /// Scalar lookup that fails with a callable-level error when absent.
    pub fn require_scalar(&self, name: &str) -> Result<UncertainValue, MethodFailure> {
        self.scalar(name)
            .ok_or_else(|| MethodFailure::new(format!("input '{}' is not a scalar", name)))
    }

    pub fn require_code(&self, name: &str) -> Result<&str, MethodFailure> {
        self.code(name)
            .ok_or_else(|| MethodFailure::new(format!("input '{}' is not a code", name)))
    }
}

/// The uniform calling convention for method implementations.
pub type MethodFn =
    dyn Fn(&ResolvedInputs<'_>, MethodFlags) -> Result<UncertainValue, MethodFailure> + Send + Sync;

/// Specification of one calculation method.
pub struct MethodSpec {
    pub parameter: String,
    pub method_id: String,
    pub level: Level,
    /// Input names: parameter slots already computed on the record, or raw
    /// field names.
    pub required_inputs: Vec<String>,
    /// Vocabulary tables keyed by categorical input name.
    pub domain_tables: BTreeMap<String, DomainTable>,
    pub supports_method_uncertainty: bool,
    callable: Box<MethodFn>,
}

impl MethodSpec {
    pub fn new(
        parameter: impl Into<String>,
        method_id: impl Into<String>,
        level: Level,
        required_inputs: impl IntoIterator<Item = impl Into<String>>,
        callable: impl Fn(&ResolvedInputs<'_>, MethodFlags) -> Result<UncertainValue, MethodFailure>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        MethodSpec {
            parameter: parameter.into(),
            method_id: method_id.into(),
            level,
            required_inputs: required_inputs.into_iter().map(Into::into).collect(),
            domain_tables: BTreeMap::new(),
            supports_method_uncertainty: false,
            callable: Box::new(callable),
        }
    }

    /// Attaches a vocabulary table for one categorical input.
    pub fn with_domain_table(mut self, input: impl Into<String>, table: DomainTable) -> Self {
        self.domain_tables.insert(input.into(), table);
        self
    }

    /// Marks the method as honoring `include_method_uncertainty`.
    pub fn with_method_uncertainty(mut self) -> Self {
        self.supports_method_uncertainty = true;
        self
    }
}

impl fmt::Debug for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSpec")
            .field("parameter", &self.parameter)
            .field("method_id", &self.method_id)
            .field("level", &self.level)
            .field("required_inputs", &self.required_inputs)
            .field("domain_tables", &self.domain_tables)
            .field(
                "supports_method_uncertainty",
                &self.supports_method_uncertainty,
            )
            .finish_non_exhaustive()
    }
}

/// The execution context handed to [`MethodRegistry::execute`].
#[derive(Debug, Clone, Copy)]
pub enum ExecutionContext<'a> {
    Layer(&'a Layer),
    Slab(&'a Slab),
}

/// The full result of one registry invocation.
#[derive(Debug)]
pub struct MethodOutcome {
    pub value: Option<UncertainValue>,
    pub failure: Option<ExecFailure>,
    /// Resolved input names to display-formatted values, for diagnostics.
    pub input_summary: BTreeMap<String, String>,
    /// Non-fatal notes (currently: general-prefix domain fallbacks).
    pub warnings: Vec<String>,
}

impl MethodOutcome {
    pub fn succeeded(&self) -> bool {
        self.value.is_some()
    }

    fn failed(failure: ExecFailure, input_summary: BTreeMap<String, String>) -> Self {
        MethodOutcome {
            value: None,
            failure: Some(failure),
            input_summary,
            warnings: Vec::new(),
        }
    }
}

/// Registry mapping `(parameter, method)` pairs to specs.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    specs: HashMap<(String, String), MethodSpec>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        MethodRegistry::default()
    }

    /// Registers a spec; fails if the `(parameter, method)` pair is taken.
    pub fn register(&mut self, spec: MethodSpec) -> Result<(), EngineError> {
        let key = (spec.parameter.clone(), spec.method_id.clone());
        if self.specs.contains_key(&key) {
            return Err(EngineError::DuplicateMethod {
                parameter: key.0,
                method: key.1,
            });
        }
        self.specs.insert(key, spec);
        Ok(())
    }

    pub fn get(&self, parameter: &str, method: &str) -> Option<&MethodSpec> {
        self.specs
            .get(&(parameter.to_string(), method.to_string()))
    }

    /// All method ids registered for a parameter, sorted.
    pub fn methods_for(&self, parameter: &str) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .specs
            .keys()
            .filter(|(p, _)| p == parameter)
            .map(|(_, m)| m.as_str())
            .collect();
        out.sort_unstable();
        out
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Resolves inputs, applies domain tables, and invokes the callable.
    ///
    /// Every failure mode comes back as a structured outcome; the only way
    /// to observe a success is a non-NaN [`UncertainValue`].
    pub fn execute(
        &self,
        parameter: &str,
        method: &str,
        ctx: ExecutionContext<'_>,
        flags: MethodFlags,
    ) -> MethodOutcome {
        let mut summary = BTreeMap::new();

        let spec = match self.get(parameter, method) {
            Some(spec) => spec,
            None => {
                return MethodOutcome::failed(
                    ExecFailure::unknown_method(parameter, method),
                    summary,
                )
            }
        };

        let matches_level = matches!(
            (spec.level, &ctx),
            (Level::Layer, ExecutionContext::Layer(_)) | (Level::Slab, ExecutionContext::Slab(_))
        );
        if !matches_level {
            return MethodOutcome::failed(
                ExecFailure::method_failed(format!(
                    "{}-level method '{}.{}' invoked with the wrong context",
                    spec.level, parameter, method
                )),
                summary,
            );
        }

        let mut inputs = ResolvedInputs {
            slab: match ctx {
                ExecutionContext::Slab(slab) => Some(slab),
                ExecutionContext::Layer(_) => None,
            },
            ..ResolvedInputs::default()
        };
        let mut warnings = Vec::new();

        for name in &spec.required_inputs {
            let field = lookup_input(&ctx, name);
            let field = match field {
                Some(field) => field,
                None => {
                    debug!(parameter, method, input = name.as_str(), "missing input");
                    return MethodOutcome::failed(ExecFailure::missing_input(name), summary);
                }
            };
            match field {
                FieldValue::Scalar(v) => {
                    summary.insert(name.clone(), v.to_string());
                    inputs.scalars.insert(name.clone(), v);
                }
                FieldValue::Code(raw) => {
                    let resolved = match spec.domain_tables.get(name) {
                        None => raw.clone(),
                        Some(table) => match table.resolve(&raw) {
                            DomainResolution::Specific(code) => code,
                            DomainResolution::General(code) => {
                                warnings.push(format!(
                                    "{}.{}: input '{}' code '{}' resolved via general class '{}'",
                                    parameter, method, name, raw, code
                                ));
                                code
                            }
                            DomainResolution::Unresolved => {
                                debug!(
                                    parameter,
                                    method,
                                    input = name.as_str(),
                                    code = raw.as_str(),
                                    "unresolved categorical input"
                                );
                                return MethodOutcome::failed(
                                    ExecFailure::unsupported_domain(name, &raw),
                                    summary,
                                );
                            }
                        },
                    };
                    summary.insert(name.clone(), resolved.clone());
                    inputs.codes.insert(name.clone(), resolved);
                }
            }
        }

        // Methods without method-uncertainty support always run in the
        // default mode; the flag only reaches callables that honor it.
        let effective = if spec.supports_method_uncertainty {
            flags
        } else {
            MethodFlags::default()
        };

        let value = match (spec.callable)(&inputs, effective) {
            Ok(value) => value,
            Err(failure) => {
                debug!(parameter, method, %failure, "method callable failed");
                return MethodOutcome {
                    value: None,
                    failure: Some(ExecFailure::method_failed(failure.to_string())),
                    input_summary: summary,
                    warnings,
                };
            }
        };

        if value.is_nan() {
            debug!(parameter, method, "method returned NaN");
            return MethodOutcome {
                value: None,
                failure: Some(ExecFailure::numerical(parameter, method)),
                input_summary: summary,
                warnings,
            };
        }

        MethodOutcome {
            value: Some(value),
            failure: None,
            input_summary: summary,
            warnings,
        }
    }
}

/// Resolves one input name against the context: computed parameter slots
/// take precedence over raw fields.
fn lookup_input(ctx: &ExecutionContext<'_>, name: &str) -> Option<FieldValue> {
    match ctx {
        ExecutionContext::Layer(layer) => layer
            .computed(name)
            .map(FieldValue::Scalar)
            .or_else(|| layer.raw(name).cloned()),
        ExecutionContext::Slab(slab) => slab
            .computed(name)
            .map(FieldValue::Scalar)
            .or_else(|| slab.raw(name).cloned()),
    }
}
