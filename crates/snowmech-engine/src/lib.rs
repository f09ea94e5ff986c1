//! Execution engine for the snowmech parameterization graph.
//!
//! Given a sealed [`ParamGraph`](snowmech_core::graph::ParamGraph) and a
//! [`MethodRegistry`](registry::MethodRegistry), the [`Engine`](engine::Engine)
//! enumerates every distinct derivation of a target parameter, executes each
//! one against an input slab, and returns per-pathway results with full
//! provenance and cache statistics.
//!
//! Failure philosophy: method-level failures (missing inputs, unsupported
//! categorical codes, NaN results) are recoverable values inside
//! [`ComputationTrace`](trace::ComputationTrace) entries and never stop
//! sibling layers or other pathways. Only programmer errors (unknown
//! target, impossible method map, duplicate registration) surface as
//! [`EngineError`](error::EngineError).

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod failure;
pub mod registry;
pub mod results;
pub mod trace;

pub use cache::{CacheStats, ComputationCache};
pub use config::ExecutionConfig;
pub use engine::{Engine, PathwaySummary};
pub use error::EngineError;
pub use failure::{ExecFailure, FailureKind, MethodFailure};
pub use registry::{
    DomainResolution, DomainTable, ExecutionContext, MethodFlags, MethodOutcome, MethodRegistry,
    MethodSpec, ResolvedInputs,
};
pub use results::{ExecutionResults, PathwayResult};
pub use trace::ComputationTrace;
